//! File space header (page 0) 表空间头（第 0 页）

use zerocopy::{
  FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned,
  byteorder::big_endian::U32,
};

use crate::{DEFAULT_PAGE_SIZE, HEADER_SIZE};

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawSpace {
  space_id: U32,
  _unused: U32,
  size: U32,
  free_limit: U32,
  flags: U32,
}

/// File space header, follows the page header on page 0
/// 表空间头，位于第 0 页页头之后
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceHeader {
  pub space_id: u32,
  /// Highest page number in file 文件内最大页号
  pub size: u32,
  /// Highest page number initialized 已初始化最大页号
  pub free_limit: u32,
  pub flags: FspFlags,
}

impl SpaceHeader {
  #[inline]
  pub fn read(page: &[u8]) -> Self {
    let raw = page
      .get(HEADER_SIZE..)
      .and_then(|b| RawSpace::read_from_prefix(b).ok())
      .map(|(raw, _)| raw)
      .unwrap_or_else(RawSpace::new_zeroed);
    Self {
      space_id: raw.space_id.get(),
      size: raw.size.get(),
      free_limit: raw.free_limit.get(),
      flags: FspFlags(raw.flags.get()),
    }
  }

  #[inline]
  pub fn write(&self, page: &mut [u8]) {
    let raw = RawSpace {
      space_id: U32::new(self.space_id),
      _unused: U32::new(0),
      size: U32::new(self.size),
      free_limit: U32::new(self.free_limit),
      flags: U32::new(self.flags.0),
    };
    if let Some(b) = page.get_mut(HEADER_SIZE..) {
      let _ = raw.write_to_prefix(b);
    }
  }
}

/// Space flags bit set 表空间标志位
///
/// ```text
/// bit 0     post-antelope
/// bit 1-4   zip ssize
/// bit 5     atomic blobs
/// bit 6-9   page ssize
/// bit 10    data dir
/// bit 11    shared
/// bit 12    temporary
/// bit 13    encrypted
/// bit 14    SDI
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FspFlags(pub u32);

impl FspFlags {
  const ZIP_SHIFT: u32 = 1;
  const PAGE_SHIFT: u32 = 6;
  const SSIZE_MASK: u32 = 0xF;

  /// Build from page size and zip size (0 = uncompressed)
  /// 由页大小和压缩页大小构造（0 表示不压缩）
  pub fn new(page_size: u32, zip_size: u32) -> Self {
    let ssize = |n: u32| {
      if n == 0 {
        0
      } else {
        n.trailing_zeros().saturating_sub(9)
      }
    };
    let page = if page_size == DEFAULT_PAGE_SIZE {
      0
    } else {
      ssize(page_size)
    };
    Self(
      ((page & Self::SSIZE_MASK) << Self::PAGE_SHIFT)
        | ((ssize(zip_size) & Self::SSIZE_MASK) << Self::ZIP_SHIFT),
    )
  }

  /// Page size, ssize 0 means the 16 KiB default
  /// 页大小，ssize 为 0 表示默认 16 KiB
  #[inline]
  pub fn page_size(&self) -> u32 {
    match (self.0 >> Self::PAGE_SHIFT) & Self::SSIZE_MASK {
      0 => DEFAULT_PAGE_SIZE,
      s => 512 << s,
    }
  }

  /// Compressed page size, 0 if not compressed
  /// 压缩页大小，不压缩时为 0
  #[inline]
  pub fn zip_size(&self) -> u32 {
    match (self.0 >> Self::ZIP_SHIFT) & Self::SSIZE_MASK {
      0 => 0,
      s => 512 << s,
    }
  }

  #[inline]
  pub fn is_data_dir(&self) -> bool {
    self.0 & (1 << 10) != 0
  }

  #[inline]
  pub fn is_shared(&self) -> bool {
    self.0 & (1 << 11) != 0
  }

  #[inline]
  pub fn is_temporary(&self) -> bool {
    self.0 & (1 << 12) != 0
  }

  #[inline]
  pub fn is_encrypted(&self) -> bool {
    self.0 & (1 << 13) != 0
  }

  #[inline]
  pub fn has_sdi(&self) -> bool {
    self.0 & (1 << 14) != 0
  }
}
