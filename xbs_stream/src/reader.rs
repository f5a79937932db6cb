//! Stream reader 流读取器

use std::io::{self, Read};

use crc32fast::Hasher;
use log::debug;

use crate::{
  Chunk, Error, Head, Kind, Result, Sparse,
  consts::{MAGIC, MAX_PATH, MAX_SPARSE},
};

/// Forward-only record reader 单向记录读取器
pub struct Reader<R> {
  src: R,
  pos: u64,
  checksum: bool,
}

impl<R: Read> Reader<R> {
  /// `checksum` tees every payload into a CRC-32 for [`Chunk::validate_checksum`]
  /// `checksum` 将负载同步计算 CRC-32，供 [`Chunk::validate_checksum`] 使用
  #[inline]
  pub fn new(src: R, checksum: bool) -> Self {
    Self {
      src,
      pos: 0,
      checksum,
    }
  }

  /// Bytes consumed so far 已消费的字节数
  #[inline]
  pub fn pos(&self) -> u64 {
    self.pos
  }

  #[inline]
  pub fn into_inner(self) -> R {
    self.src
  }

  fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
    match self.src.read_exact(buf) {
      Ok(()) => {
        self.pos += buf.len() as u64;
        Ok(())
      }
      Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
        Err(Error::Truncated { offset: self.pos })
      }
      Err(e) => Err(e.into()),
    }
  }

  fn u8(&mut self) -> Result<u8> {
    let mut b = [0u8; 1];
    self.read_exact(&mut b)?;
    Ok(b[0])
  }

  fn u32(&mut self) -> Result<u32> {
    let mut b = [0u8; 4];
    self.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
  }

  fn u64(&mut self) -> Result<u64> {
    let mut b = [0u8; 8];
    self.read_exact(&mut b)?;
    Ok(u64::from_le_bytes(b))
  }

  /// Fill magic; false on clean end of stream
  /// 读取魔数；流正常结束时返回 false
  fn magic(&mut self) -> Result<bool> {
    let mut magic = [0u8; MAGIC.len()];
    let mut got = 0;
    while got < magic.len() {
      match self.src.read(&mut magic[got..]) {
        Ok(0) if got == 0 => return Ok(false),
        Ok(0) => return Err(Error::Truncated { offset: self.pos + got as u64 }),
        Ok(n) => got += n,
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => return Err(e.into()),
      }
    }
    if &magic != MAGIC {
      return Err(Error::Magic { offset: self.pos });
    }
    self.pos += magic.len() as u64;
    Ok(true)
  }

  /// Next record, `None` at end of stream
  /// 下一条记录，流结束时返回 `None`
  pub fn next(&mut self) -> Result<Option<Chunk<'_, R>>> {
    let start = self.pos;
    if !self.magic()? {
      return Ok(None);
    }

    let flags = self.u8()?;
    let typ = self.u8()?;
    let kind = Kind::from_u8(typ);
    let mut head = Head {
      flags,
      kind,
      ..Default::default()
    };
    if matches!(kind, Kind::Unknown(_)) {
      if !head.is_ignorable() {
        return Err(Error::UnknownType { typ, offset: start });
      }
      debug!("ignorable record type {typ:#04x} at offset {start}");
    }

    let path_len = self.u32()?;
    if path_len > MAX_PATH {
      return Err(Error::PathLen {
        len: path_len as u64,
        offset: start,
      });
    }
    let mut path = vec![0u8; path_len as usize];
    self.read_exact(&mut path)?;
    head.path = String::from_utf8(path).map_err(|_| Error::Path { offset: start })?;

    let mut crc = self.checksum.then(Hasher::new);

    if kind == Kind::Eof {
      return Ok(Some(self.chunk(head, crc)));
    }

    let mut sparse_len = 0i32;
    if kind == Kind::Sparse {
      sparse_len = self.u32()? as i32;
      if sparse_len <= 0 || sparse_len > MAX_SPARSE {
        return Err(Error::SparseLen {
          len: sparse_len as i64,
          offset: start,
        });
      }
    }

    head.payload_len = self.u64()?;
    head.offset = self.u64()?;
    head.checksum = self.u32()?;

    if sparse_len > 0 {
      let mut sum = 0u64;
      let mut raw = [0u8; 8];
      head.sparse.reserve(sparse_len as usize);
      for _ in 0..sparse_len {
        self.read_exact(&mut raw)?;
        if let Some(crc) = &mut crc {
          crc.update(&raw);
        }
        let entry = Sparse {
          skip: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
          write: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        };
        sum += entry.write as u64;
        head.sparse.push(entry);
      }
      if sum != head.payload_len {
        return Err(Error::SparseSum {
          sum,
          payload_len: head.payload_len,
          offset: start,
        });
      }
    }

    Ok(Some(self.chunk(head, crc)))
  }

  #[inline]
  fn chunk(&mut self, head: Head, crc: Option<Hasher>) -> Chunk<'_, R> {
    Chunk {
      left: head.payload_len,
      head,
      src: &mut self.src,
      pos: &mut self.pos,
      crc,
    }
  }
}
