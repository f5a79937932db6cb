#![cfg_attr(docsrs, feature(doc_cfg))]

//! Chunked backup stream protocol 分块备份流协议
//!
//! ## Record Layout (little-endian)
//! ```text
//! | magic(8) | flags(1) | type(1) | path_len(4) | path |
//!   E: stop here
//!   S: | sparse_len(4) |
//! | payload_len(8) | offset(8) | crc32(4) | sparse map (skip(4) write(4))* | payload |
//!                               |<-- crc32 covers sparse map + payload -->|
//! ```

mod chunk;
pub mod consts;
pub mod error;
mod reader;
mod writer;

pub use chunk::{Chunk, Head, Kind, Sparse};
pub use consts::{FLAG_IGNORABLE, MAGIC, MAX_PATH, MAX_SPARSE};
pub use error::{Error, Result};
pub use reader::Reader;
pub use writer::Writer;
