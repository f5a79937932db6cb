//! Page-granular tablespace file reader
//! 按页读取表空间文件

use std::{
  fs::File,
  io::{Read, Seek, SeekFrom},
};

use crate::{
  Error, Result, SpaceHeader,
  consts::{SPACE_HEADER_END, valid_page_size},
};

/// Tablespace file read page by page
/// 按页读取的表空间文件
pub struct PageFile<'a> {
  file: &'a File,
  page_size: u32,
  len: u64,
}

impl<'a> PageFile<'a> {
  /// Use a known page size 使用已知页大小
  pub fn new(file: &'a File, page_size: u32) -> Result<Self> {
    if !valid_page_size(page_size) {
      return Err(Error::PageSize(page_size));
    }
    let len = file.metadata()?.len();
    Ok(Self {
      file,
      page_size,
      len,
    })
  }

  /// Detect page size from the space header on page 0
  /// 从第 0 页的表空间头检测页大小
  pub fn open(file: &'a File) -> Result<Self> {
    let len = file.metadata()?.len();
    if len < SPACE_HEADER_END as u64 {
      return Err(Error::Short(len));
    }
    let mut head = [0u8; SPACE_HEADER_END];
    let mut f = file;
    f.seek(SeekFrom::Start(0))?;
    f.read_exact(&mut head)?;
    Self::new(file, SpaceHeader::read(&head).flags.page_size())
  }

  #[inline]
  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  /// Number of whole pages in file 文件内完整页数
  #[inline]
  pub fn page_count(&self) -> u64 {
    self.len / self.page_size as u64
  }

  /// Read page `no` into `buf`, false past the last whole page
  /// 读取第 `no` 页到 `buf`，超出最后完整页时返回 false
  pub fn read(&self, no: u64, buf: &mut [u8]) -> Result<bool> {
    if no >= self.page_count() {
      return Ok(false);
    }
    let buf = &mut buf[..self.page_size as usize];
    let mut f = self.file;
    f.seek(SeekFrom::Start(no * self.page_size as u64))?;
    f.read_exact(buf)?;
    Ok(true)
  }

  #[inline]
  pub fn file(&self) -> &File {
    self.file
  }
}
