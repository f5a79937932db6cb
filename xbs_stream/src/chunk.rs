//! Stream record 流记录

use std::io::{self, Read};

use crc32fast::Hasher;

use crate::{
  Error, Result,
  consts::{FLAG_IGNORABLE, TYPE_EOF, TYPE_PAYLOAD, TYPE_SPARSE},
};

/// Record type 记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
  #[default]
  Payload,
  Sparse,
  Eof,
  /// Only surfaced when the ignorable flag is set
  /// 仅在设置可忽略标志时出现
  Unknown(u8),
}

impl Kind {
  #[inline]
  pub fn from_u8(v: u8) -> Self {
    match v {
      TYPE_PAYLOAD => Self::Payload,
      TYPE_SPARSE => Self::Sparse,
      TYPE_EOF => Self::Eof,
      v => Self::Unknown(v),
    }
  }

  #[inline]
  pub fn as_u8(self) -> u8 {
    match self {
      Self::Payload => TYPE_PAYLOAD,
      Self::Sparse => TYPE_SPARSE,
      Self::Eof => TYPE_EOF,
      Self::Unknown(v) => v,
    }
  }
}

/// Sparse map entry: seek `skip` bytes then write `write` payload bytes
/// 稀疏映射项：跳过 `skip` 字节后写入 `write` 字节负载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sparse {
  pub skip: u32,
  pub write: u32,
}

/// Record header 记录头
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Head {
  pub flags: u8,
  pub kind: Kind,
  pub path: String,
  pub payload_len: u64,
  /// Destination byte offset 目标字节偏移
  pub offset: u64,
  pub checksum: u32,
  pub sparse: Vec<Sparse>,
}

impl Head {
  #[inline]
  pub fn is_eof(&self) -> bool {
    self.kind == Kind::Eof
  }

  #[inline]
  pub fn is_ignorable(&self) -> bool {
    self.flags & FLAG_IGNORABLE != 0
  }
}

/// Record with its payload, borrows the reader until dropped
/// 带负载的记录，释放前独占读取器
///
/// The payload is a bounded source over the wire; read it to the end
/// (or [`Chunk::drain`]) before asking the reader for the next record.
/// 负载是线上的有界数据源；请求下一条记录前须读完（或 [`Chunk::drain`]）。
pub struct Chunk<'a, R> {
  pub head: Head,
  pub(crate) src: &'a mut R,
  pub(crate) pos: &'a mut u64,
  pub(crate) left: u64,
  pub(crate) crc: Option<Hasher>,
}

impl<R: Read> Chunk<'_, R> {
  #[inline]
  pub fn path(&self) -> &str {
    &self.head.path
  }

  #[inline]
  pub fn kind(&self) -> Kind {
    self.head.kind
  }

  #[inline]
  pub fn offset(&self) -> u64 {
    self.head.offset
  }

  #[inline]
  pub fn payload_len(&self) -> u64 {
    self.head.payload_len
  }

  #[inline]
  pub fn sparse(&self) -> &[Sparse] {
    &self.head.sparse
  }

  /// Payload bytes not yet read 尚未读取的负载字节
  #[inline]
  pub fn left(&self) -> u64 {
    self.left
  }

  /// Stream offset of the next unread payload byte
  /// 下一个未读负载字节的流偏移
  #[inline]
  pub fn stream_pos(&self) -> u64 {
    *self.pos
  }

  /// Read and discard the rest of the payload
  /// 读取并丢弃剩余负载
  pub fn drain(&mut self) -> Result<u64> {
    Ok(io::copy(self, &mut io::sink())?)
  }

  /// Compare the running CRC-32 with the recorded checksum
  /// 比较累计 CRC-32 与记录的校验和
  pub fn validate_checksum(&self) -> Result<()> {
    let Some(crc) = &self.crc else {
      return Err(Error::ChecksumOff);
    };
    if self.left > 0 {
      return Err(Error::Unread(self.left));
    }
    let actual = crc.clone().finalize();
    if actual != self.head.checksum {
      return Err(Error::Checksum {
        expected: self.head.checksum,
        actual,
      });
    }
    Ok(())
  }
}

impl<R: Read> Read for Chunk<'_, R> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    if self.left == 0 || buf.is_empty() {
      return Ok(0);
    }
    let max = buf.len().min(usize::try_from(self.left).unwrap_or(usize::MAX));
    let n = self.src.read(&mut buf[..max])?;
    if n == 0 {
      return Err(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("payload of {} truncated at offset {}", self.head.path, self.pos),
      ));
    }
    self.left -= n as u64;
    *self.pos += n as u64;
    if let Some(crc) = &mut self.crc {
      crc.update(&buf[..n]);
    }
    Ok(n)
  }
}
