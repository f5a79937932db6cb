//! 错误定义 Error definitions

use thiserror::Error;

/// 结果类型 Result type
pub type Result<T> = std::result::Result<T, Error>;

/// 错误类型 Error type
#[derive(Error, Debug)]
pub enum Error {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("fs: {0}")]
  Fs(#[from] xbs_fs::Error),

  #[error("page: {0}")]
  Page(#[from] xbs_page::Error),

  #[error("space: {0}")]
  Space(#[from] xbs_space::Error),

  #[error("stream: {0}")]
  Stream(#[from] xbs_stream::Error),

  #[error("delta: {0}")]
  Delta(#[from] xbs_delta::Error),

  #[error("walk: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("encrypted file {0} is not supported")]
  Encrypted(Box<str>),

  #[error("no decompressor for .{0}")]
  NoDecompressor(Box<str>),

  #[error("protocol: {0}")]
  Protocol(Box<str>),

  #[error("offset mismatch: expected {expected}, got {actual}")]
  Offset { expected: u64, actual: u64 },

  #[error("piped file {0} carries a sparse map")]
  SparseCompressed(Box<str>),

  #[error("config: {0}")]
  Config(&'static str),

  #[error("background task for {0} ended without result")]
  TaskLost(Box<str>),

  #[error("pipe closed")]
  PipeClosed,

  #[error("{path} at stream offset {offset}: {source}")]
  Chunk {
    path: String,
    offset: u64,
    source: Box<Error>,
  },
}

impl Error {
  /// Innermost error, unwrapping [`Error::Chunk`]
  /// 最内层错误，剥离 [`Error::Chunk`]
  pub fn root(&self) -> &Error {
    match self {
      Self::Chunk { source, .. } => source.root(),
      e => e,
    }
  }
}
