#![cfg_attr(docsrs, feature(doc_cfg))]

//! Incremental tablespace delta 增量表空间差异
//!
//! A `<file>.meta` sidecar describes the tablespace; `<file>.delta` is a
//! sequence of blocks, each a page-sized header listing big-endian page
//! numbers followed by those pages.
//! `<file>.meta` 描述表空间；`<file>.delta` 由若干块组成，每块是列出大端页号的
//! 页大小头部，随后是对应页内容。
//!
//! ```text
//! | "xtra" / "XTRA" | page_no(4) * n | 0xFFFFFFFF | zero fill | page * n |
//! ```

mod block;
pub mod error;
mod meta;

pub use block::{Block, MARKER_LAST, MARKER_MORE, PAGE_END, build, capacity, minimal};
pub use error::{Error, Result};
pub use meta::Meta;
