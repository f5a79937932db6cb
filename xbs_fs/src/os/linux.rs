//! Linux specific implementations

use std::{fs::File, io, os::fd::AsRawFd};

pub fn punch_hole(file: &File, offset: u64, len: u64) -> io::Result<()> {
  let (Ok(off), Ok(len)) = (libc::off_t::try_from(offset), libc::off_t::try_from(len)) else {
    return Err(io::Error::from(io::ErrorKind::InvalidInput));
  };
  let mode = libc::FALLOC_FL_PUNCH_HOLE | libc::FALLOC_FL_KEEP_SIZE;
  if unsafe { libc::fallocate(file.as_raw_fd(), mode, off, len) } < 0 {
    return Err(io::Error::last_os_error());
  }
  Ok(())
}

pub fn is_unsupported_errno(errno: Option<i32>) -> bool {
  matches!(errno, Some(libc::EOPNOTSUPP) | Some(libc::ENOSYS))
}
