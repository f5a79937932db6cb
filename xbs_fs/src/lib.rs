#![cfg_attr(docsrs, feature(doc_cfg))]

//! xbs_fs - File operations for stream extraction
//! 流解包的文件操作

mod add_ext;
pub mod error;
pub mod fs;
pub mod hole;
mod os;

pub use add_ext::add_ext;
pub use error::{Error, Result};
pub use fs::{create, open_rw, safe_join, write_file};
pub use hole::{is_unsupported, punch_hole};
