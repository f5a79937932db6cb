use std::{
  fs::File,
  io::{self, Read, Seek, SeekFrom, Write},
  path::Path,
};

use xbs_fs::{create, is_unsupported, punch_hole};
use xbs_stream::{Chunk, Kind};

use crate::{Flow, Result};

/// Verbatim copy 原样复制
pub struct CopySink {
  file: File,
  /// Furthest byte written or skipped 已写入或跳过的最远位置
  end: u64,
}

impl CopySink {
  pub fn new(dir: &Path, key: &str) -> Result<Self> {
    Ok(Self {
      file: create(dir, key)?,
      end: 0,
    })
  }

  pub fn process<R: Read>(&mut self, chunk: &mut Chunk<'_, R>) -> Result<Flow> {
    if chunk.kind() == Kind::Eof {
      self.finish()?;
      return Ok(Flow::Closed);
    }

    let mut pos = chunk.offset();
    self.file.seek(SeekFrom::Start(pos))?;
    if chunk.sparse().is_empty() {
      pos += io::copy(chunk, &mut self.file)?;
    } else {
      let map = chunk.sparse().to_vec();
      for s in map {
        if s.skip > 0 {
          self.file.seek(SeekFrom::Current(s.skip as i64))?;
          match punch_hole(&self.file, pos, s.skip as u64) {
            Err(e) if !is_unsupported(&e) => return Err(e.into()),
            _ => {}
          }
          pos += s.skip as u64;
        }
        let n = io::copy(&mut chunk.by_ref().take(s.write as u64), &mut self.file)?;
        if n != s.write as u64 {
          return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        pos += n;
      }
    }
    self.end = self.end.max(pos);
    Ok(Flow::More)
  }

  /// Extend to the furthest position so a trailing hole survives
  /// 扩展到最远位置，保留尾部空洞
  fn finish(&mut self) -> Result<()> {
    if self.file.metadata()?.len() < self.end {
      self.file.set_len(self.end)?;
    }
    self.file.flush()?;
    Ok(())
  }

  pub fn close(mut self) -> Result<()> {
    self.finish()
  }
}
