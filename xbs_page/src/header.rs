//! Page header and trailer 页头与页尾
//!
//! ## Header Layout (big-endian)
//! ```text
//! | checksum(4) | page_no(4) | prev(4) | next(4) | lsn(8) | type(2) | flush_lsn(8) | space_id(4) |
//! ```
//! For compressed pages `flush_lsn` holds:
//! ```text
//! | version(1) | algo(1) | orig_type(2) | orig_size(2) | compressed_size(2) |
//! ```

use zerocopy::{
  FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned,
  byteorder::big_endian::{U16, U32, U64},
};

use crate::{HEADER_SIZE, PageType};

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawHeader {
  checksum: U32,
  page_no: U32,
  prev: U32,
  next: U32,
  lsn: U64,
  typ: U16,
  flush_lsn: U64,
  space_id: U32,
}

const _: () = assert!(size_of::<RawHeader>() == HEADER_SIZE);

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawTrailer {
  checksum: U32,
  low_lsn: U32,
}

/// Page header 页头
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
  pub checksum: u32,
  pub page_no: u32,
  /// Same-level links 同层链接
  pub prev: u32,
  pub next: u32,
  /// Last modified LSN 最后修改 LSN
  pub lsn: u64,
  pub typ: PageType,
  pub flush_lsn: u64,
  pub space_id: u32,
}

impl Header {
  /// Read from page bytes, zero header if too short
  /// 从页字节读取，长度不足时返回零值
  #[inline]
  pub fn read(page: &[u8]) -> Self {
    let raw = RawHeader::read_from_prefix(page)
      .map(|(raw, _)| raw)
      .unwrap_or_else(|_| RawHeader::new_zeroed());
    Self {
      checksum: raw.checksum.get(),
      page_no: raw.page_no.get(),
      prev: raw.prev.get(),
      next: raw.next.get(),
      lsn: raw.lsn.get(),
      typ: raw.typ.get().into(),
      flush_lsn: raw.flush_lsn.get(),
      space_id: raw.space_id.get(),
    }
  }

  /// Write into the first [`HEADER_SIZE`] bytes; shorter buffers are untouched
  /// 写入前 [`HEADER_SIZE`] 字节；更短的缓冲不做修改
  #[inline]
  pub fn write(&self, page: &mut [u8]) {
    let raw = RawHeader {
      checksum: U32::new(self.checksum),
      page_no: U32::new(self.page_no),
      prev: U32::new(self.prev),
      next: U32::new(self.next),
      lsn: U64::new(self.lsn),
      typ: U16::new(self.typ.into()),
      flush_lsn: U64::new(self.flush_lsn),
      space_id: U32::new(self.space_id),
    };
    let _ = raw.write_to_prefix(page);
  }

  /// Compressed page metadata, zero unless type is [`PageType::Compressed`]
  /// 压缩页元数据，非压缩页返回零值
  #[inline]
  pub fn compressed(&self) -> CompressedMeta {
    if self.typ != PageType::Compressed {
      return CompressedMeta::default();
    }
    let v = self.flush_lsn;
    CompressedMeta {
      version: (v >> 56) as u8,
      algo: (v >> 48) as u8,
      orig_type: ((v >> 32) as u16).into(),
      orig_size: (v >> 16) as u16,
      compressed_size: v as u16,
    }
  }
}

/// Transparent compression metadata 透明压缩元数据
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressedMeta {
  pub version: u8,
  pub algo: u8,
  pub orig_type: PageType,
  pub orig_size: u16,
  /// Compressed payload size, excludes the page header
  /// 压缩后数据大小，不含页头
  pub compressed_size: u16,
}

impl CompressedMeta {
  /// Pack into the `flush_lsn` field
  /// 打包为 `flush_lsn` 字段
  #[inline]
  pub fn flush_lsn(&self) -> u64 {
    (self.version as u64) << 56
      | (self.algo as u64) << 48
      | (u16::from(self.orig_type) as u64) << 32
      | (self.orig_size as u64) << 16
      | self.compressed_size as u64
  }

  /// Bytes of the page actually in use
  /// 页内实际使用的字节数
  #[inline]
  pub fn used_len(&self) -> u32 {
    HEADER_SIZE as u32 + self.compressed_size as u32
  }
}

/// Page trailer, read but never validated
/// 页尾，只读取不校验
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trailer {
  /// Old-style checksum 旧式校验和
  pub checksum: u32,
  /// Low 32 bits of LSN LSN 低 32 位
  pub low_lsn: u32,
}

impl Trailer {
  /// Read the last 8 bytes of a page
  /// 读取页的最后 8 字节
  #[inline]
  pub fn read(page: &[u8]) -> Self {
    let raw = RawTrailer::read_from_suffix(page)
      .map(|(_, raw)| raw)
      .unwrap_or_else(|_| RawTrailer::new_zeroed());
    Self {
      checksum: raw.checksum.get(),
      low_lsn: raw.low_lsn.get(),
    }
  }

  #[inline]
  pub fn write(&self, page: &mut [u8]) {
    let raw = RawTrailer {
      checksum: U32::new(self.checksum),
      low_lsn: U32::new(self.low_lsn),
    };
    let _ = raw.write_to_suffix(page);
  }
}
