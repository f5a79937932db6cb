use std::{
  io::{self, Read, Write},
  path::Path,
  sync::Arc,
};

use log::debug;
use xbs_compress::Decompressor;
use xbs_fs::create;
use xbs_stream::{Chunk, Kind};

use super::{is_ibd, repair};
use crate::{Error, Flow, Result, pipe::Piped};

/// Decompressing copy 解压复制
///
/// All records of one compressed member form a single compressed stream,
/// so payloads must arrive contiguous and unsparse.
/// 一个压缩成员的全部记录构成单一压缩流，负载须连续且无稀疏映射。
pub struct DecompressSink {
  piped: Option<Piped>,
}

impl DecompressSink {
  pub fn new(dir: &Path, key: &str, codec: Arc<dyn Decompressor>) -> Result<Self> {
    let mut file = create(dir, key)?;
    let path = xbs_fs::safe_join(dir, key)?;
    let ibd = is_ibd(key);
    let piped = Piped::spawn(key, Some(codec), move |src: &mut (dyn Read + Send)| {
      let n = io::copy(src, &mut file)?;
      file.flush()?;
      debug!("{}: {n} bytes decompressed", path.display());
      if ibd {
        repair(&file, &path, None)?;
      }
      Ok(())
    })?;
    Ok(Self { piped: Some(piped) })
  }

  pub fn process<R: Read>(&mut self, chunk: &mut Chunk<'_, R>) -> Result<Flow> {
    if chunk.kind() == Kind::Eof {
      self.finish()?;
      return Ok(Flow::Closed);
    }
    match &mut self.piped {
      Some(piped) => piped.feed(chunk)?,
      None => return Err(Error::Protocol(format!("{} written after close", chunk.path()).into())),
    }
    Ok(Flow::More)
  }

  /// Close the pipe, wait for decompression and repair
  /// 关闭管道，等待解压与修复完成
  fn finish(&mut self) -> Result<()> {
    match self.piped.take() {
      Some(piped) => piped.finish(),
      None => Ok(()),
    }
  }

  pub fn close(mut self) -> Result<()> {
    self.finish()
  }
}
