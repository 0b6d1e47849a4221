//! Opcode classification by leading-byte bit prefix.
//!
//! Families share bit patterns at different prefix widths, so the table is
//! ranked from the longest prefix (8 bits) to the shortest (4 bits) and the
//! first hit wins.

use crate::instruction::{Condition, Operation};

/// An instruction encoding family, selected from the leading byte alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
  /// `0111_cccc disp8`
  ConditionalJump(Condition),
  /// `1010_000w addr-lo addr-hi`
  MovMemoryToAccumulator,
  /// `1010_001w addr-lo addr-hi`
  MovAccumulatorToMemory,
  /// `1100_011w mod-000-rm [disp] data [data]`
  MovImmediateToRegisterMemory,
  /// `00_ooo_10w data [data]`
  ImmediateToAccumulator(Operation),
  /// `oooooo_dw mod-reg-rm [disp]`
  RegisterMemoryWithRegister(Operation),
  /// `100000_sw mod-ooo-rm [disp] data [data]`
  ArithmeticImmediateToRegisterMemory,
  /// `1011_wreg data [data]`
  MovImmediateToRegister,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
  /// Number of leading bits compared.
  pub width: u32,
  pub bits: u8,
  pub family: Family,
}

const fn pattern(width: u32, bits: u8, family: Family) -> Pattern {
  Pattern {
    width,
    bits,
    family,
  }
}

const fn jump(condition: Condition) -> Pattern {
  pattern(8, 0b_0111_0000 | condition as u8, Family::ConditionalJump(condition))
}

pub const PATTERNS: [Pattern; 28] = [
  jump(Condition::Overflow),
  jump(Condition::NotOverflow),
  jump(Condition::Below),
  jump(Condition::NotBelow),
  jump(Condition::Equal),
  jump(Condition::NotEqual),
  jump(Condition::BelowOrEqual),
  jump(Condition::Above),
  jump(Condition::Sign),
  jump(Condition::NotSign),
  jump(Condition::Parity),
  jump(Condition::NotParity),
  jump(Condition::Less),
  jump(Condition::NotLess),
  jump(Condition::LessOrEqual),
  jump(Condition::Greater),
  pattern(7, 0b_1010000, Family::MovMemoryToAccumulator),
  pattern(7, 0b_1010001, Family::MovAccumulatorToMemory),
  pattern(7, 0b_1100011, Family::MovImmediateToRegisterMemory),
  pattern(7, 0b_0000010, Family::ImmediateToAccumulator(Operation::Add)),
  pattern(7, 0b_0010110, Family::ImmediateToAccumulator(Operation::Sub)),
  pattern(7, 0b_0011110, Family::ImmediateToAccumulator(Operation::Cmp)),
  pattern(6, 0b_100010, Family::RegisterMemoryWithRegister(Operation::Mov)),
  pattern(6, 0b_000000, Family::RegisterMemoryWithRegister(Operation::Add)),
  pattern(6, 0b_001010, Family::RegisterMemoryWithRegister(Operation::Sub)),
  pattern(6, 0b_001110, Family::RegisterMemoryWithRegister(Operation::Cmp)),
  pattern(6, 0b_100000, Family::ArithmeticImmediateToRegisterMemory),
  pattern(4, 0b_1011, Family::MovImmediateToRegister),
];

impl Pattern {
  pub fn matches(&self, byte: u8) -> bool {
    byte >> (8 - self.width) == self.bits
  }
}

pub fn classify(byte: u8) -> Option<Family> {
  PATTERNS
    .iter()
    .find(|pattern| pattern.matches(byte))
    .map(|pattern| pattern.family)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_patterns_ranked_longest_first() {
    for pair in PATTERNS.windows(2) {
      assert!(pair[0].width >= pair[1].width, "{pair:?}");
    }
  }

  #[test]
  fn test_patterns_fit_their_width() {
    for pattern in PATTERNS {
      assert!(u32::from(pattern.bits) < 1 << pattern.width, "{pattern:?}");
    }
  }

  #[test]
  fn test_no_byte_matches_two_patterns() {
    for byte in 0..=u8::MAX {
      let hits: Vec<_> = PATTERNS.iter().filter(|p| p.matches(byte)).collect();
      assert!(hits.len() <= 1, "{byte:08b} matches {hits:?}");
    }
  }

  #[test]
  fn test_classify_families() {
    use Family::*;
    assert_eq!(classify(0x74), Some(ConditionalJump(Condition::Equal)));
    assert_eq!(classify(0x79), Some(ConditionalJump(Condition::NotSign)));
    assert_eq!(classify(0xA1), Some(MovMemoryToAccumulator));
    assert_eq!(classify(0xA2), Some(MovAccumulatorToMemory));
    assert_eq!(classify(0xC6), Some(MovImmediateToRegisterMemory));
    assert_eq!(classify(0x05), Some(ImmediateToAccumulator(Operation::Add)));
    assert_eq!(classify(0x2C), Some(ImmediateToAccumulator(Operation::Sub)));
    assert_eq!(classify(0x3D), Some(ImmediateToAccumulator(Operation::Cmp)));
    assert_eq!(classify(0x89), Some(RegisterMemoryWithRegister(Operation::Mov)));
    assert_eq!(classify(0x03), Some(RegisterMemoryWithRegister(Operation::Add)));
    assert_eq!(classify(0x2A), Some(RegisterMemoryWithRegister(Operation::Sub)));
    assert_eq!(classify(0x39), Some(RegisterMemoryWithRegister(Operation::Cmp)));
    assert_eq!(classify(0x83), Some(ArithmeticImmediateToRegisterMemory));
    assert_eq!(classify(0xB1), Some(MovImmediateToRegister));
    assert_eq!(classify(0xBF), Some(MovImmediateToRegister));
  }

  #[test]
  fn test_classify_unknown() {
    for byte in [0x0F, 0x90, 0xC3, 0xE2, 0xFF] {
      assert_eq!(classify(byte), None, "{byte:#04x}");
    }
  }
}
