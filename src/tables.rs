//! Fixed name tables from the 8086 manual (chapter 4, table 4-9).

/// Register names for `w = 0`, indexed by the 3-bit reg or r/m field.
pub const REGISTERS_W0: [&str; 8] = ["al", "cl", "dl", "bl", "ah", "ch", "dh", "bh"];

/// Register names for `w = 1`, indexed by the 3-bit reg or r/m field.
pub const REGISTERS_W1: [&str; 8] = ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"];

/// Base/index expressions for a memory r/m field (mod != 11).
pub const EFFECTIVE_ADDRESSES: [&str; 8] = [
  "bx + si", "bx + di", "bp + si", "bp + di", "si", "di", "bp", "bx",
];

/// r/m value that means "direct address" when mod = 00.
pub const DIRECT_ADDRESS_RM: u8 = 0b_110;

pub fn register_name(field: u8, w_bit_set: bool) -> &'static str {
  let index = usize::from(field & 0b111);
  if w_bit_set {
    REGISTERS_W1[index]
  } else {
    REGISTERS_W0[index]
  }
}

pub fn effective_address(rm: u8) -> &'static str {
  EFFECTIVE_ADDRESSES[usize::from(rm & 0b111)]
}
