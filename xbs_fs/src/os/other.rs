//! Fallback for platforms without hole punching
//! 不支持打洞的平台

use std::{fs::File, io};

pub fn punch_hole(_file: &File, _offset: u64, _len: u64) -> io::Result<()> {
  Err(io::Error::from(io::ErrorKind::Unsupported))
}

pub fn is_unsupported_errno(_errno: Option<i32>) -> bool {
  false
}
