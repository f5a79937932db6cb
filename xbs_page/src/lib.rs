#![cfg_attr(docsrs, feature(doc_cfg))]

//! Tablespace page codec 表空间页编解码
//!
//! Pages are fixed-size (1 KiB - 64 KiB) and start with a 38-byte
//! big-endian header; the last 8 bytes are a trailer.
//! 页定长（1 KiB - 64 KiB），以 38 字节大端页头开始，末尾 8 字节为页尾。

pub mod consts;
pub mod error;
mod file;
mod header;
mod page_type;
mod repair;
mod space;

pub use consts::{DEFAULT_PAGE_SIZE, HEADER_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE, TRAILER_SIZE};
pub use error::{Error, Result};
pub use file::PageFile;
pub use header::{CompressedMeta, Header, Trailer};
pub use page_type::PageType;
pub use repair::repair_sparse;
pub use space::{FspFlags, SpaceHeader};
