//! 错误定义 Error definitions

use std::path::PathBuf;

use thiserror::Error;

/// 结果类型 Result type
pub type Result<T> = std::result::Result<T, Error>;

/// 错误类型 Error type
#[derive(Error, Debug)]
pub enum Error {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("walk: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("fs: {0}")]
  Fs(#[from] xbs_fs::Error),

  #[error("space header of {path:?}: {source}")]
  Decode {
    path: PathBuf,
    source: xbs_page::Error,
  },

  #[error("space id {0} not found")]
  NotFound(u32),

  #[error("space ids not collected")]
  NotCollected,
}
