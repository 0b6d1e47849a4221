use crate::classify::{classify, Family};
use crate::error::{DecodeError, DecodeResult};
use crate::instruction::{
  Condition, Immediate, Instruction, MemoryReference, Operand, Operation, Register, Width,
};
use crate::tables::DIRECT_ADDRESS_RM;
use log::{debug, trace};
use std::iter::FusedIterator;

/// A decoded instruction and the cursor just past its last byte.
pub type Decoded = (Instruction, usize);

/// Outcome of one classify-and-decode step. `instruction` is `None` when the
/// leading byte matched nothing and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
  pub cursor: usize,
  pub instruction: Option<Instruction>,
}

/// Listing that reassembles with nasm: `bits 16`, one line per instruction.
pub fn disassemble(bytes: &[u8]) -> DecodeResult<String> {
  let mut lines = vec!["bits 16".to_string()];
  lines.extend(decode_lines(bytes)?);
  lines.push("".to_string());
  Ok(lines.join("\n"))
}

pub fn decode_lines(bytes: &[u8]) -> DecodeResult<Vec<String>> {
  Decoder::new(bytes)
    .map(|decoded| decoded.map(|instruction| instruction.to_string()))
    .collect()
}

pub fn classify_and_decode(bytes: &[u8], cursor: usize) -> DecodeResult<Step> {
  let byte = Reader::at(bytes, cursor).u8()?;
  let decoded = match classify(byte) {
    Some(Family::ConditionalJump(condition)) => {
      Some(decode_conditional_jump(bytes, cursor, condition)?)
    }
    Some(Family::MovMemoryToAccumulator) => Some(decode_mov_accumulator(bytes, cursor, true)?),
    Some(Family::MovAccumulatorToMemory) => Some(decode_mov_accumulator(bytes, cursor, false)?),
    Some(Family::MovImmediateToRegisterMemory) => {
      Some(decode_mov_immediate_to_register_memory(bytes, cursor)?)
    }
    Some(Family::ImmediateToAccumulator(operation)) => {
      Some(decode_immediate_to_accumulator(bytes, cursor, operation)?)
    }
    Some(Family::RegisterMemoryWithRegister(operation)) => {
      Some(decode_register_memory_with_register(bytes, cursor, operation)?)
    }
    Some(Family::ArithmeticImmediateToRegisterMemory) => {
      decode_arithmetic_immediate_to_register_memory(bytes, cursor)?
    }
    Some(Family::MovImmediateToRegister) => Some(decode_mov_immediate_to_register(bytes, cursor)?),
    None => None,
  };

  match decoded {
    Some((instruction, next)) => {
      trace!("{cursor:#06x}..{next:#06x}: {instruction}");
      Ok(Step {
        cursor: next,
        instruction: Some(instruction),
      })
    }
    None => {
      debug!("no instruction matches byte {byte:#04x} at offset {cursor}, skipping it");
      Ok(Step {
        cursor: cursor + 1,
        instruction: None,
      })
    }
  }
}

/// Walks a whole buffer, yielding instructions in order. Unrecognized bytes
/// are skipped; the first out-of-bounds error ends the iteration.
pub struct Decoder<'a> {
  bytes: &'a [u8],
  cursor: usize,
  failed: bool,
}

impl<'a> Decoder<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self {
      bytes,
      cursor: 0,
      failed: false,
    }
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }
}

impl Iterator for Decoder<'_> {
  type Item = DecodeResult<Instruction>;

  fn next(&mut self) -> Option<Self::Item> {
    while !self.failed && self.cursor < self.bytes.len() {
      match classify_and_decode(self.bytes, self.cursor) {
        Ok(step) => {
          self.cursor = step.cursor;
          if let Some(instruction) = step.instruction {
            return Some(Ok(instruction));
          }
        }
        Err(err) => {
          self.failed = true;
          return Some(Err(err));
        }
      }
    }
    None
  }
}

impl FusedIterator for Decoder<'_> {}

/// `0111_cccc disp8`
pub fn decode_conditional_jump(
  bytes: &[u8],
  cursor: usize,
  condition: Condition,
) -> DecodeResult<Decoded> {
  let mut reader = Reader::at(bytes, cursor);
  reader.u8()?;
  let displacement = reader.i8()?;
  Ok(reader.finish(Instruction::jump(condition, displacement)))
}

/// `oooooo_dw mod-reg-rm [disp-lo] [disp-hi]`
pub fn decode_register_memory_with_register(
  bytes: &[u8],
  cursor: usize,
  operation: Operation,
) -> DecodeResult<Decoded> {
  let mut reader = Reader::at(bytes, cursor);
  let b1 = reader.u8()?;
  let d_bit_set = (b1 >> 1) & 0b1 == 1;
  let width = Width::from_w_bit(b1 & 0b1 == 1);
  let mod_rm = ModRm::from(reader.u8()?);
  let reg = Operand::Register(Register::new(mod_rm.reg, width));
  let rm = reader.rm_operand(mod_rm, width)?;
  let (destination, source) = if d_bit_set { (reg, rm) } else { (rm, reg) };
  Ok(reader.finish(Instruction::pair(operation, width, destination, source)))
}

/// `100000_sw mod-ooo-rm [disp-lo] [disp-hi] data [data]`
///
/// Returns `None` when the op sub-field names an operation other than
/// add, sub or cmp.
pub fn decode_arithmetic_immediate_to_register_memory(
  bytes: &[u8],
  cursor: usize,
) -> DecodeResult<Option<Decoded>> {
  let mut reader = Reader::at(bytes, cursor);
  let b1 = reader.u8()?;
  let s_bit_set = (b1 >> 1) & 0b1 == 1;
  let w_bit_set = b1 & 0b1 == 1;
  let mod_rm = ModRm::from(reader.u8()?);
  let operation = match mod_rm.reg {
    0b_000 => Operation::Add,
    0b_101 => Operation::Sub,
    0b_111 => Operation::Cmp,
    _ => return Ok(None),
  };
  let width = Width::from_w_bit(w_bit_set);
  let destination = reader.rm_operand(mod_rm, width)?;
  let immediate = match (s_bit_set, w_bit_set) {
    (false, true) => Immediate::unsigned_word(reader.u16()?),
    // s=1,w=1: one byte, sign-extended to a word
    _ => Immediate::signed_byte(reader.u8()?),
  };
  let source = sized_for(&destination, immediate);
  let instruction = Instruction::pair(operation, width, destination, source);
  Ok(Some(reader.finish(instruction)))
}

/// `00_ooo_10w data [data]`
pub fn decode_immediate_to_accumulator(
  bytes: &[u8],
  cursor: usize,
  operation: Operation,
) -> DecodeResult<Decoded> {
  let mut reader = Reader::at(bytes, cursor);
  let b1 = reader.u8()?;
  let width = Width::from_w_bit(b1 & 0b1 == 1);
  let immediate = match width {
    Width::Word => Immediate::unsigned_word(reader.u16()?),
    Width::Byte => Immediate::signed_byte(reader.u8()?),
  };
  let destination = Operand::Register(Register::accumulator(width));
  let instruction = Instruction::pair(operation, width, destination, Operand::Immediate(immediate));
  Ok(reader.finish(instruction))
}

/// `1011_wreg data [data]`
pub fn decode_mov_immediate_to_register(bytes: &[u8], cursor: usize) -> DecodeResult<Decoded> {
  let mut reader = Reader::at(bytes, cursor);
  let b1 = reader.u8()?;
  let width = Width::from_w_bit((b1 >> 3) & 0b1 == 1);
  let immediate = match width {
    Width::Word => Immediate::signed_word(reader.u16()?),
    Width::Byte => Immediate::signed_byte(reader.u8()?),
  };
  let destination = Operand::Register(Register::new(b1, width));
  let instruction = Instruction::pair(
    Operation::Mov,
    width,
    destination,
    Operand::Immediate(immediate),
  );
  Ok(reader.finish(instruction))
}

/// `1100_011w mod-000-rm [disp-lo] [disp-hi] data [data]`
pub fn decode_mov_immediate_to_register_memory(
  bytes: &[u8],
  cursor: usize,
) -> DecodeResult<Decoded> {
  let mut reader = Reader::at(bytes, cursor);
  let b1 = reader.u8()?;
  let width = Width::from_w_bit(b1 & 0b1 == 1);
  let mod_rm = ModRm::from(reader.u8()?);
  let destination = reader.rm_operand(mod_rm, width)?;
  let immediate = match width {
    Width::Word => Immediate::unsigned_word(reader.u16()?),
    Width::Byte => Immediate::unsigned_byte(reader.u8()?),
  };
  let source = sized_for(&destination, immediate);
  Ok(reader.finish(Instruction::pair(Operation::Mov, width, destination, source)))
}

/// `1010_00dw addr-lo addr-hi`, where `to_accumulator` is the inverse of `d`.
pub fn decode_mov_accumulator(
  bytes: &[u8],
  cursor: usize,
  to_accumulator: bool,
) -> DecodeResult<Decoded> {
  let mut reader = Reader::at(bytes, cursor);
  let b1 = reader.u8()?;
  let width = Width::from_w_bit(b1 & 0b1 == 1);
  let memory = Operand::Memory(MemoryReference::Direct(reader.u16()?));
  let accumulator = Operand::Register(Register::accumulator(width));
  let (destination, source) = if to_accumulator {
    (accumulator, memory)
  } else {
    (memory, accumulator)
  };
  Ok(reader.finish(Instruction::pair(Operation::Mov, width, destination, source)))
}

// a pure memory destination gives no hint of the operand width
fn sized_for(destination: &Operand, immediate: Immediate) -> Operand {
  match destination {
    Operand::Memory(_) => Operand::Immediate(immediate.sized()),
    _ => Operand::Immediate(immediate),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModRm {
  r#mod: u8,
  reg: u8,
  rm: u8,
}

impl From<u8> for ModRm {
  fn from(b2: u8) -> Self {
    Self {
      r#mod: b2 >> 6,
      reg: (b2 >> 3) & 0b0000_0111,
      rm: b2 & 0b0000_0111,
    }
  }
}

/// Bounds-checked little-endian reads over one instruction's bytes.
struct Reader<'a> {
  bytes: &'a [u8],
  start: usize,
  pos: usize,
}

impl<'a> Reader<'a> {
  fn at(bytes: &'a [u8], cursor: usize) -> Self {
    Self {
      bytes,
      start: cursor,
      pos: cursor,
    }
  }

  fn u8(&mut self) -> DecodeResult<u8> {
    let byte = *self.bytes.get(self.pos).ok_or(DecodeError::OutOfBounds {
      start: self.start,
      offset: self.pos,
      len: self.bytes.len(),
    })?;
    self.pos += 1;
    Ok(byte)
  }

  fn i8(&mut self) -> DecodeResult<i8> {
    Ok(self.u8()? as i8)
  }

  fn u16(&mut self) -> DecodeResult<u16> {
    let lo = self.u8()?;
    let hi = self.u8()?;
    Ok(u16::from_le_bytes([lo, hi]))
  }

  /// Resolves the r/m side of a mod-reg-rm byte, consuming any displacement.
  fn rm_operand(&mut self, mod_rm: ModRm, width: Width) -> DecodeResult<Operand> {
    let ModRm { r#mod, rm, .. } = mod_rm;
    let memory = match r#mod {
      0b_11 => return Ok(Operand::Register(Register::new(rm, width))),
      0b_00 if rm == DIRECT_ADDRESS_RM => MemoryReference::Direct(self.u16()?),
      0b_00 => MemoryReference::Based { rm, displacement: 0 },
      0b_01 => MemoryReference::Based {
        rm,
        displacement: i16::from(self.i8()?),
      },
      _ => MemoryReference::Based {
        rm,
        displacement: self.u16()? as i16,
      },
    };
    Ok(Operand::Memory(memory))
  }

  fn finish(self, instruction: Instruction) -> Decoded {
    (instruction, self.pos)
  }
}
