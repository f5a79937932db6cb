//! 错误定义 Error definitions

use thiserror::Error;

/// 结果类型 Result type
pub type Result<T> = std::result::Result<T, Error>;

/// 错误类型 Error type
#[derive(Error, Debug)]
pub enum Error {
  #[error("meta is not utf-8")]
  Utf8,

  #[error("bad meta line: {0:?}")]
  Line(Box<str>),

  #[error("bad meta value for {key}: {val:?}")]
  Value { key: &'static str, val: Box<str> },

  #[error("meta lacks {0}")]
  Missing(&'static str),

  #[error("unsupported page size: {0}")]
  PageSize(u32),

  #[error("unexpected delta block marker {0:?}")]
  Marker([u8; 4]),

  #[error("delta block lists {count} pages, a non-last block must list {expect}")]
  Count { count: usize, expect: usize },

  #[error("delta block header is {len} bytes, page size is {page_size}")]
  HeadLen { len: usize, page_size: u32 },
}
