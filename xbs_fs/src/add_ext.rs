//! Append extension utilities
//! 追加扩展名工具

use std::{ffi::OsStr, path::PathBuf};

/// Append ".{ext}" keeping any existing extension
/// 追加 ".{ext}"，保留原有扩展名
///
/// ```
/// use std::path::PathBuf;
/// use xbs_fs::add_ext;
///
/// assert_eq!(add_ext("db/t1.ibd", "delta"), PathBuf::from("db/t1.ibd.delta"));
/// ```
pub fn add_ext(path: impl Into<PathBuf>, ext: impl AsRef<OsStr>) -> PathBuf {
  let mut storage = path.into().into_os_string();
  storage.push(".");
  storage.push(ext);
  PathBuf::from(storage)
}
