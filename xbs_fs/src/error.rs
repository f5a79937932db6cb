//! Error types for xbs_fs
//! xbs_fs 错误类型

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("unsafe path in stream: {0}")]
  Path(Box<str>),
}
