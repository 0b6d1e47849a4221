//! 8086 disassembler for MOV, ADD, SUB, CMP and the short conditional jumps.

pub mod classify;
pub mod decode;
pub mod error;
pub mod instruction;
pub mod tables;

pub use decode::{classify_and_decode, decode_lines, disassemble, Decoder, Step};
pub use error::{DecodeError, DecodeResult};
pub use instruction::Instruction;
