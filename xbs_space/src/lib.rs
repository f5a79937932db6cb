#![cfg_attr(docsrs, feature(doc_cfg))]

//! Space id catalog of a data directory
//! 数据目录的表空间 ID 目录

pub mod error;
mod space_ids;

pub use error::{Error, Result};
pub use space_ids::{EXT, SpaceIds};
