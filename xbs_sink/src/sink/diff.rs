//! Incremental delta sink 增量差异 sink
//!
//! `AwaitMeta -> Ready -> Applying -> Closed`. The `.meta` member picks a
//! strategy; the pipe starts on the first `.delta` record, whose suffix
//! decides the codec.
//! `.meta` 成员决定策略；管道在首个 `.delta` 记录时启动，由其后缀决定解码器。

use std::{
  fs::File,
  io::{self, Read, Seek, SeekFrom, Write},
  mem,
  path::{Path, PathBuf},
  sync::Arc,
};

use log::{debug, info};
use xbs_compress::Decompressor;
use xbs_delta::{Block, Meta, minimal};
use xbs_fs::{add_ext, create, open_rw, safe_join, write_file};
use xbs_space::SpaceIds;
use xbs_stream::{Chunk, Kind};

use super::repair;
use crate::{
  Error, Flow, Result, Route, Target,
  pipe::{Piped, read_full},
};

/// A `.meta` sidecar is a handful of `key = value` lines
/// `.meta` 附属文件只有几行 `key = value`
const META_MAX: u64 = 64 * 1024;

/// Where the delta goes 差异去向
#[derive(Debug, Clone, PartialEq, Eq)]
enum Strategy {
  /// Apply pages onto this data-dir file 将页应用到数据目录下的该文件
  Apply(PathBuf),
  /// Unknown tablespace, keep the raw delta in the incremental dir
  /// 未知表空间，原始差异保存到增量目录
  Copy,
}

enum State {
  AwaitMeta,
  Ready { meta: Meta, strategy: Strategy },
  Applying(Piped),
  Closed,
}

pub struct DiffSink {
  key: String,
  data_dir: PathBuf,
  incr_dir: PathBuf,
  space_ids: Arc<SpaceIds>,
  state: State,
}

impl DiffSink {
  pub fn new(key: &str, data_dir: &Path, incr_dir: &Path, space_ids: Arc<SpaceIds>) -> Self {
    Self {
      key: key.into(),
      data_dir: data_dir.into(),
      incr_dir: incr_dir.into(),
      space_ids,
      state: State::AwaitMeta,
    }
  }

  pub fn process<R: Read>(&mut self, route: &Route, chunk: &mut Chunk<'_, R>) -> Result<Flow> {
    match route.target {
      Target::Meta => self.meta(route, chunk),
      Target::Delta => self.delta(route, chunk),
      Target::Copy => Err(self.protocol("mixes plain and delta members")),
    }
  }

  fn protocol(&self, msg: &str) -> Error {
    Error::Protocol(format!("{}: {msg}", self.key).into())
  }

  fn meta<R: Read>(&mut self, route: &Route, chunk: &mut Chunk<'_, R>) -> Result<Flow> {
    if chunk.kind() == Kind::Eof {
      return Ok(Flow::More);
    }
    if !matches!(self.state, State::AwaitMeta) {
      return Err(self.protocol("second .meta"));
    }

    if chunk.payload_len() > META_MAX {
      return Err(self.protocol(&format!(".meta of {} bytes", chunk.payload_len())));
    }
    let mut raw = Vec::new();
    chunk.read_to_end(&mut raw)?;
    if let Some(codec) = &route.codec {
      let mut out = Vec::new();
      codec
        .decompress(Box::new(&raw[..]))?
        .take(META_MAX + 1)
        .read_to_end(&mut out)?;
      if out.len() as u64 > META_MAX {
        return Err(self.protocol(".meta expands beyond limit"));
      }
      raw = out;
    }

    let meta = Meta::parse(&raw)?;
    write_file(&self.incr_dir, add_ext(&self.key, "meta"), &raw)?;
    let strategy = self.resolve(&meta)?;
    debug!("{}: {meta:?} {strategy:?}", self.key);
    self.state = State::Ready { meta, strategy };
    Ok(Flow::More)
  }

  /// Catalog hit, then a direct probe of the stream path, else a new tablespace
  /// 先查目录，再直接探测流路径，否则视为新表空间
  fn resolve(&self, meta: &Meta) -> Result<Strategy> {
    let id = meta.space_id;
    match self.space_ids.get(id) {
      Ok(old) => {
        if old != Path::new(&self.key) {
          info!("space {id} moved from {} to {}", old.display(), self.key);
        }
        Ok(Strategy::Apply(old.to_path_buf()))
      }
      Err(xbs_space::Error::NotFound(_)) => match self.space_ids.check(id, &self.key) {
        Ok(()) => {
          debug!("space {id} missed by catalog but found at {}", self.key);
          Ok(Strategy::Apply(PathBuf::from(&self.key)))
        }
        Err(xbs_space::Error::NotFound(_)) => {
          info!("new space {id} at {}, delta kept in incremental dir", self.key);
          Ok(Strategy::Copy)
        }
        Err(e) => Err(e.into()),
      },
      Err(e) => Err(e.into()),
    }
  }

  fn delta<R: Read>(&mut self, route: &Route, chunk: &mut Chunk<'_, R>) -> Result<Flow> {
    let mut piped = match mem::replace(&mut self.state, State::Closed) {
      State::AwaitMeta => {
        self.state = State::AwaitMeta;
        return Err(self.protocol(".delta before .meta"));
      }
      State::Closed => return Err(self.protocol(".delta after close")),
      State::Ready { meta, strategy } => self.start(meta, strategy, route.codec.clone())?,
      State::Applying(piped) => piped,
    };

    if chunk.kind() == Kind::Eof {
      piped.finish()?;
      return Ok(Flow::Closed);
    }
    piped.feed(chunk)?;
    self.state = State::Applying(piped);
    Ok(Flow::More)
  }

  fn start(
    &self,
    meta: Meta,
    strategy: Strategy,
    codec: Option<Arc<dyn Decompressor>>,
  ) -> Result<Piped> {
    let delta_rel = add_ext(&self.key, "delta");
    match strategy {
      Strategy::Copy => {
        let mut file = create(&self.incr_dir, &delta_rel)?;
        let key = self.key.clone();
        Piped::spawn(&self.key, codec, move |src: &mut (dyn Read + Send)| {
          let n = io::copy(src, &mut file)?;
          file.flush()?;
          debug!("[INCR] {key}.delta: {n} bytes copied");
          Ok(())
        })
      }
      Strategy::Apply(rel) => {
        let file = open_rw(&self.data_dir, &rel)?;
        let path = safe_join(&self.data_dir, &rel)?;
        let incr_dir = self.incr_dir.clone();
        Piped::spawn(&self.key, codec, move |src: &mut (dyn Read + Send)| {
          apply(src, file, &path, meta, &incr_dir, &delta_rel)
        })
      }
    }
  }

  pub fn close(self) -> Result<()> {
    match self.state {
      State::Applying(piped) => piped.finish(),
      _ => Ok(()),
    }
  }
}

/// Write every listed page at `page_no * page_size`
///
/// The first page also becomes a one-page delta in the incremental dir
/// so prepare replays it and handles renames itself.
/// 首页同时写成增量目录中的单页差异，由 prepare 重放并处理改名。
fn apply(
  src: &mut (dyn Read + Send),
  mut file: File,
  path: &Path,
  meta: Meta,
  incr_dir: &Path,
  delta_rel: &Path,
) -> Result<()> {
  let ps = meta.page_size as usize;
  let mut head = vec![0u8; ps];
  let mut page = vec![0u8; ps];
  let mut blocks = 0u64;
  let mut pages = 0u64;

  loop {
    let n = read_full(src, &mut head)?;
    if n == 0 && blocks == 0 {
      debug!("{}: empty delta", path.display());
      break;
    }
    if n < ps {
      return Err(
        io::Error::new(
          io::ErrorKind::UnexpectedEof,
          format!("delta block header cut at {n} bytes"),
        )
        .into(),
      );
    }
    let block = Block::parse(&head, meta.page_size)?;
    blocks += 1;

    for &no in &block.pages {
      src.read_exact(&mut page)?;
      file.seek(SeekFrom::Start(no as u64 * ps as u64))?;
      file.write_all(&page)?;
      if pages == 0 {
        let raw = minimal(meta.page_size, Some((no, &page)));
        write_file(incr_dir, delta_rel, &raw)?;
        debug!("[INCR] {}: {} bytes", delta_rel.display(), raw.len());
      }
      pages += 1;
    }
    if block.last {
      break;
    }
  }

  if pages == 0 {
    write_file(incr_dir, delta_rel, &minimal(meta.page_size, None))?;
  }
  file.flush()?;
  debug!("[DATA] {}: {pages} pages in {blocks} blocks applied", path.display());
  repair(&file, path, Some(meta.page_size))?;
  Ok(())
}
