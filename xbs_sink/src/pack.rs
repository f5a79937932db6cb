use std::{
  fs::File,
  io::Write,
  path::{Component, Path},
};

use log::info;
use walkdir::WalkDir;
use xbs_stream::Writer;

use crate::{Conf, Config, Error, Result, Stat, pipe::read_full};

/// Pack every file under `root` into a stream, sorted by path
/// 将 `root` 下所有文件按路径顺序打包为流
///
/// Records carry at most [`Conf::ChunkSize`] payload bytes.
pub fn pack<W: Write>(root: impl AsRef<Path>, dst: W, conf: &[Conf]) -> Result<Stat> {
  let config = Config::from(conf);
  let root = root.as_ref();
  let mut writer = Writer::new(dst);
  let mut buf = vec![0u8; config.chunk_size];
  let mut stat = Stat::default();

  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }
    let path = stream_path(entry.path().strip_prefix(root).unwrap_or(entry.path()))?;
    let mut file = File::open(entry.path())?;
    let mut offset = 0u64;
    loop {
      let n = read_full(&mut file, &mut buf)?;
      if n == 0 {
        break;
      }
      writer.payload(&path, offset, &buf[..n])?;
      offset += n as u64;
      stat.chunks += 1;
      stat.bytes += n as u64;
    }
    writer.eof(&path)?;
    stat.chunks += 1;
    stat.files += 1;
  }

  writer.into_inner().flush()?;
  info!("packed {} files, {} bytes from {}", stat.files, stat.bytes, root.display());
  Ok(stat)
}

/// `/`-joined relative path 以 `/` 连接的相对路径
fn stream_path(rel: &Path) -> Result<String> {
  let mut li = Vec::new();
  for c in rel.components() {
    match c {
      Component::Normal(p) => li.push(
        p.to_str()
          .ok_or_else(|| Error::Protocol(format!("non utf-8 path {}", rel.display()).into()))?,
      ),
      _ => return Err(Error::Protocol(format!("bad path {}", rel.display()).into())),
    }
  }
  Ok(li.join("/"))
}
