//! Hole punching
//! 打洞
//!
//! Deallocates a byte range while keeping the logical file size, so the
//! range reads back as zeros and takes no disk space.
//! 释放字节区间但保留逻辑文件大小，读回为零且不占磁盘空间。

use std::{fs::File, io};

use crate::os;

/// Punch a hole over `[offset, offset + len)`
/// 在 `[offset, offset + len)` 上打洞
///
/// Filesystems without support report an error matched by [`is_unsupported`].
/// 不支持的文件系统返回可由 [`is_unsupported`] 识别的错误。
#[inline]
pub fn punch_hole(file: &File, offset: u64, len: u64) -> io::Result<()> {
  if len == 0 {
    return Ok(());
  }
  os::punch_hole(file, offset, len)
}

/// Whether the error means the filesystem cannot punch holes
/// 错误是否表示文件系统不支持打洞
#[inline]
pub fn is_unsupported(e: &io::Error) -> bool {
  e.kind() == io::ErrorKind::Unsupported || os::is_unsupported_errno(e.raw_os_error())
}
