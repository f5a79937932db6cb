//! 错误定义 Error definitions

use thiserror::Error;

/// 结果类型 Result type
pub type Result<T> = std::result::Result<T, Error>;

/// 错误类型 Error type
///
/// Framing errors carry the stream offset; after one the stream position
/// cannot be trusted.
/// 帧错误携带流偏移；出现后流位置不可再信任。
#[derive(Error, Debug)]
pub enum Error {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("wrong record magic at offset {offset}")]
  Magic { offset: u64 },

  #[error("unknown record type {typ:#04x} at offset {offset}")]
  UnknownType { typ: u8, offset: u64 },

  #[error("path length {len} is too large at offset {offset}")]
  PathLen { len: u64, offset: u64 },

  #[error("path is not utf-8 at offset {offset}")]
  Path { offset: u64 },

  #[error("bad sparse map length {len} at offset {offset}")]
  SparseLen { len: i64, offset: u64 },

  #[error("sparse map writes {sum} bytes but payload is {payload_len} at offset {offset}")]
  SparseSum {
    sum: u64,
    payload_len: u64,
    offset: u64,
  },

  #[error("stream truncated at offset {offset}")]
  Truncated { offset: u64 },

  #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
  Checksum { expected: u32, actual: u32 },

  #[error("checksum disabled on this reader")]
  ChecksumOff,

  #[error("payload not fully read, {0} bytes left")]
  Unread(u64),
}
