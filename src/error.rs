use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  /// The instruction starting at `start` needs byte `offset`, which lies past
  /// the end of a `len`-byte buffer.
  #[error("out of bounds: instruction at offset {start} needs byte {offset} but the buffer holds {len}")]
  OutOfBounds {
    start: usize,
    offset: usize,
    len: usize,
  },
}

pub type DecodeResult<T> = Result<T, DecodeError>;
