//! Stream writer 流写入器

use std::io::Write;

use crc32fast::Hasher;

use crate::{
  Result, Sparse,
  consts::{MAGIC, MAX_PATH, TYPE_EOF, TYPE_PAYLOAD, TYPE_SPARSE},
  error::Error,
};

/// Record writer 记录写入器
pub struct Writer<W> {
  dst: W,
  pos: u64,
}

impl<W: Write> Writer<W> {
  #[inline]
  pub fn new(dst: W) -> Self {
    Self { dst, pos: 0 }
  }

  #[inline]
  pub fn pos(&self) -> u64 {
    self.pos
  }

  #[inline]
  pub fn into_inner(self) -> W {
    self.dst
  }

  fn put(&mut self, buf: &[u8]) -> Result<()> {
    self.dst.write_all(buf)?;
    self.pos += buf.len() as u64;
    Ok(())
  }

  fn head(&mut self, flags: u8, typ: u8, path: &str) -> Result<()> {
    let len = path.len() as u64;
    if len > MAX_PATH as u64 {
      return Err(Error::PathLen {
        len,
        offset: self.pos,
      });
    }
    self.put(MAGIC)?;
    self.put(&[flags, typ])?;
    self.put(&(len as u32).to_le_bytes())?;
    self.put(path.as_bytes())
  }

  fn tail(&mut self, len: u64, offset: u64, checksum: u32) -> Result<()> {
    self.put(&len.to_le_bytes())?;
    self.put(&offset.to_le_bytes())?;
    self.put(&checksum.to_le_bytes())
  }

  /// Plain payload record 普通负载记录
  pub fn payload(&mut self, path: &str, offset: u64, data: &[u8]) -> Result<()> {
    self.head(0, TYPE_PAYLOAD, path)?;
    self.tail(data.len() as u64, offset, crc32fast::hash(data))?;
    self.put(data)
  }

  /// Sparse record, `data` holds only the written bytes
  /// 稀疏记录，`data` 仅包含实际写入的字节
  pub fn sparse(&mut self, path: &str, offset: u64, map: &[Sparse], data: &[u8]) -> Result<()> {
    let sum: u64 = map.iter().map(|s| s.write as u64).sum();
    if map.is_empty() || sum != data.len() as u64 {
      return Err(Error::SparseSum {
        sum,
        payload_len: data.len() as u64,
        offset: self.pos,
      });
    }
    let mut raw = Vec::with_capacity(map.len() * 8);
    for s in map {
      raw.extend_from_slice(&s.skip.to_le_bytes());
      raw.extend_from_slice(&s.write.to_le_bytes());
    }
    let mut crc = Hasher::new();
    crc.update(&raw);
    crc.update(data);

    self.head(0, TYPE_SPARSE, path)?;
    self.put(&(map.len() as u32).to_le_bytes())?;
    self.tail(data.len() as u64, offset, crc.finalize())?;
    self.put(&raw)?;
    self.put(data)
  }

  /// End-of-file record 文件结束记录
  pub fn eof(&mut self, path: &str) -> Result<()> {
    self.head(0, TYPE_EOF, path)
  }

  /// Record with arbitrary type and flags, header only
  /// 任意类型与标志的记录，仅写头
  pub fn raw(&mut self, flags: u8, typ: u8, path: &str) -> Result<()> {
    self.head(flags, typ, path)?;
    self.tail(0, 0, 0)
  }

  /// Whole file as payload records then EOF
  /// 整个文件拆为负载记录并以 EOF 结尾
  pub fn file(&mut self, path: &str, data: &[u8], chunk_size: usize) -> Result<()> {
    let mut offset = 0u64;
    for part in data.chunks(chunk_size.max(1)) {
      self.payload(path, offset, part)?;
      offset += part.len() as u64;
    }
    self.eof(path)
  }

  /// Whole file with zero runs of at least `block` bytes elided as holes
  /// 整个文件，不小于 `block` 字节的零段以空洞省略
  pub fn sparse_file(&mut self, path: &str, data: &[u8], chunk_size: usize, block: usize) -> Result<()> {
    let block = block.max(1);
    let mut offset = 0u64;
    for part in data.chunks(chunk_size.max(1)) {
      let (map, body) = split_holes(part, block);
      if map.len() == 1 && map[0].skip == 0 {
        self.payload(path, offset, part)?;
      } else if map.is_empty() {
        // all zero, keep the extent with a one byte write at its end
        let last = part.len() - 1;
        let map = [Sparse {
          skip: last as u32,
          write: 1,
        }];
        self.sparse(path, offset, &map, &part[last..])?;
      } else {
        self.sparse(path, offset, &map, &body)?;
      }
      offset += part.len() as u64;
    }
    self.eof(path)
  }
}

/// Split a chunk into (skip, write) runs; skips are whole `block` multiples of zeros
fn split_holes(part: &[u8], block: usize) -> (Vec<Sparse>, Vec<u8>) {
  let mut map: Vec<Sparse> = Vec::new();
  let mut body = Vec::with_capacity(part.len());
  let mut skip = 0u32;
  for b in part.chunks(block) {
    let zero = b.len() == block && b.iter().all(|&x| x == 0);
    if zero {
      skip += b.len() as u32;
      continue;
    }
    match map.last_mut() {
      Some(last) if skip == 0 => last.write += b.len() as u32,
      _ => map.push(Sparse {
        skip,
        write: b.len() as u32,
      }),
    }
    skip = 0;
    body.extend_from_slice(b);
  }
  if skip > 0 && !map.is_empty() {
    // trailing hole, carry it into a one byte write so the extent is kept
    map.push(Sparse {
      skip: skip - 1,
      write: 1,
    });
    body.push(0);
  }
  (map, body)
}
