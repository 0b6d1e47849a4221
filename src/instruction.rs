use crate::tables::{effective_address, register_name};
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
  Byte,
  Word,
}

impl Width {
  pub fn from_w_bit(w_bit_set: bool) -> Self {
    if w_bit_set {
      Width::Word
    } else {
      Width::Byte
    }
  }

  pub fn is_word(self) -> bool {
    self == Width::Word
  }
}

impl Display for Width {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Width::Byte => f.write_str("byte"),
      Width::Word => f.write_str("word"),
    }
  }
}

/// A register operand, kept as its encoded (width, 3-bit field) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
  width: Width,
  field: u8,
}

impl Register {
  pub fn new(field: u8, width: Width) -> Self {
    Self {
      width,
      field: field & 0b111,
    }
  }

  pub fn accumulator(width: Width) -> Self {
    Self::new(0b_000, width)
  }

  pub fn width(self) -> Width {
    self.width
  }

  pub fn field(self) -> u8 {
    self.field
  }

  pub fn name(self) -> &'static str {
    register_name(self.field, self.width.is_word())
  }
}

impl Display for Register {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Immediate data. `width` is how many bytes the encoding carried, which is
/// also what a size keyword names when `sized` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Immediate {
  pub value: i32,
  pub width: Width,
  pub sized: bool,
}

impl Immediate {
  pub fn signed_byte(byte: u8) -> Self {
    Self::new(i32::from(byte as i8), Width::Byte)
  }

  pub fn unsigned_byte(byte: u8) -> Self {
    Self::new(i32::from(byte), Width::Byte)
  }

  pub fn signed_word(word: u16) -> Self {
    Self::new(i32::from(word as i16), Width::Word)
  }

  pub fn unsigned_word(word: u16) -> Self {
    Self::new(i32::from(word), Width::Word)
  }

  /// Renders with an explicit `byte`/`word` keyword.
  pub fn sized(self) -> Self {
    Self {
      sized: true,
      ..self
    }
  }

  fn new(value: i32, width: Width) -> Self {
    Self {
      value,
      width,
      sized: false,
    }
  }
}

impl Display for Immediate {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.sized {
      write!(f, "{} {}", self.width, self.value)
    } else {
      write!(f, "{}", self.value)
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryReference {
  /// mod = 00, r/m = 110: absolute 16-bit address, no base expression.
  Direct(u16),
  /// One of the eight base/index expressions plus a displacement
  /// (zero for mod = 00).
  Based { rm: u8, displacement: i16 },
}

impl Display for MemoryReference {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      MemoryReference::Direct(address) => write!(f, "[{address}]"),
      MemoryReference::Based { rm, displacement } => {
        let base = effective_address(rm);
        match displacement {
          0 => write!(f, "[{base}]"),
          d if d < 0 => write!(f, "[{base} - {}]", d.unsigned_abs()),
          d => write!(f, "[{base} + {d}]"),
        }
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
  Register(Register),
  Immediate(Immediate),
  Memory(MemoryReference),
}

impl Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Operand::Register(register) => register.fmt(f),
      Operand::Immediate(immediate) => immediate.fmt(f),
      Operand::Memory(memory) => memory.fmt(f),
    }
  }
}

/// Short conditional jump conditions, numbered by the low nibble of
/// their `0111_cccc` opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
  Overflow = 0x0,
  NotOverflow = 0x1,
  Below = 0x2,
  NotBelow = 0x3,
  Equal = 0x4,
  NotEqual = 0x5,
  BelowOrEqual = 0x6,
  Above = 0x7,
  Sign = 0x8,
  NotSign = 0x9,
  Parity = 0xA,
  NotParity = 0xB,
  Less = 0xC,
  NotLess = 0xD,
  LessOrEqual = 0xE,
  Greater = 0xF,
}

impl Condition {
  pub const ALL: [Condition; 16] = [
    Condition::Overflow,
    Condition::NotOverflow,
    Condition::Below,
    Condition::NotBelow,
    Condition::Equal,
    Condition::NotEqual,
    Condition::BelowOrEqual,
    Condition::Above,
    Condition::Sign,
    Condition::NotSign,
    Condition::Parity,
    Condition::NotParity,
    Condition::Less,
    Condition::NotLess,
    Condition::LessOrEqual,
    Condition::Greater,
  ];

  pub fn opcode(self) -> u8 {
    0b_0111_0000 | self as u8
  }

  pub fn mnemonic(self) -> &'static str {
    match self {
      Condition::Overflow => "jo",
      Condition::NotOverflow => "jno",
      Condition::Below => "jb",
      Condition::NotBelow => "jnb",
      Condition::Equal => "je",
      Condition::NotEqual => "jne",
      Condition::BelowOrEqual => "jbe",
      Condition::Above => "ja",
      Condition::Sign => "js",
      Condition::NotSign => "jns",
      Condition::Parity => "jp",
      Condition::NotParity => "jnp",
      Condition::Less => "jl",
      Condition::NotLess => "jnl",
      Condition::LessOrEqual => "jle",
      Condition::Greater => "jg",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Mov,
  Add,
  Sub,
  Cmp,
  Jump(Condition),
}

impl Operation {
  pub fn mnemonic(self) -> &'static str {
    match self {
      Operation::Mov => "mov",
      Operation::Add => "add",
      Operation::Sub => "sub",
      Operation::Cmp => "cmp",
      Operation::Jump(condition) => condition.mnemonic(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
  Pair {
    destination: Operand,
    source: Operand,
  },
  /// Raw signed IP-relative displacement of a short jump.
  Displacement(i8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
  pub operation: Operation,
  pub width: Width,
  pub operands: Operands,
}

impl Instruction {
  pub fn pair(operation: Operation, width: Width, destination: Operand, source: Operand) -> Self {
    Self {
      operation,
      width,
      operands: Operands::Pair {
        destination,
        source,
      },
    }
  }

  pub fn jump(condition: Condition, displacement: i8) -> Self {
    Self {
      operation: Operation::Jump(condition),
      width: Width::Byte,
      operands: Operands::Displacement(displacement),
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let mnemonic = self.operation.mnemonic();
    match &self.operands {
      Operands::Pair {
        destination,
        source,
      } => write!(f, "{mnemonic} {destination}, {source}"),
      Operands::Displacement(displacement) => write!(f, "{mnemonic} {displacement}"),
    }
  }
}
