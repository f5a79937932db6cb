use std::{
  collections::{HashMap, hash_map::Entry},
  fs,
  io::Read,
  path::Path,
  sync::Arc,
};

use log::{debug, info, warn};
use xbs_compress::Codecs;
use xbs_space::SpaceIds;
use xbs_stream::{Chunk, Kind, Reader};

use crate::{Conf, Config, Ctx, Error, Flow, Result, Router, Sink};

/// Extraction summary 解包统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stat {
  /// Members closed by an end-of-file record 由文件结束记录关闭的成员数
  pub files: u64,
  pub chunks: u64,
  /// Payload bytes read 读取的负载字节数
  pub bytes: u64,
  /// Keys still open at end of stream, sorted 流结束时仍未关闭的键，已排序
  pub unclosed: Vec<String>,
}

/// Extract `src` into `data_dir`
///
/// Any error aborts the pass; it is wrapped with the record path and the
/// stream offset where that record starts.
/// 任何错误都会中止解包，并附带记录路径与记录起始的流偏移。
pub fn extract<R: Read>(
  src: R,
  data_dir: impl AsRef<Path>,
  conf: &[Conf],
  codecs: &Codecs,
) -> Result<Stat> {
  let config = Config::from(conf);
  config.check()?;
  let data_dir = data_dir.as_ref();
  fs::create_dir_all(data_dir)?;
  if let Some(dir) = &config.incremental {
    fs::create_dir_all(dir)?;
  }

  let space_ids = if config.apply_diff {
    let mut ids = SpaceIds::new(data_dir);
    ids.collect()?;
    Some(Arc::new(ids))
  } else {
    None
  };
  let ctx = Ctx {
    data_dir: data_dir.to_path_buf(),
    out_dir: config
      .incremental
      .clone()
      .unwrap_or_else(|| data_dir.to_path_buf()),
    incr_dir: config.incremental.clone(),
    space_ids,
  };
  let router = Router::new(&config, codecs);

  let mut reader = Reader::new(src, config.checksum);
  let mut sinks: HashMap<String, Sink> = HashMap::new();
  let mut stat = Stat::default();

  loop {
    let offset = reader.pos();
    let mut chunk = match reader.next() {
      Ok(Some(chunk)) => chunk,
      Ok(None) => break,
      Err(e) => {
        abort(sinks);
        return Err(e.into());
      }
    };
    stat.chunks += 1;
    stat.bytes = stat.bytes.saturating_add(chunk.payload_len());
    if let Err(e) = step(&router, &ctx, &config, &mut sinks, &mut chunk, &mut stat) {
      if let Err(d) = chunk.drain() {
        debug!("drain {}: {d}", chunk.path());
      }
      let err = Error::Chunk {
        path: chunk.head.path.clone(),
        offset,
        source: Box::new(e),
      };
      abort(sinks);
      return Err(err);
    }
  }

  let mut keys: Vec<String> = sinks.keys().cloned().collect();
  keys.sort_unstable();
  for key in keys {
    if let Some(sink) = sinks.remove(&key) {
      warn!("{key} was not closed properly, stream may be broken");
      if let Err(e) = sink.close() {
        warn!("close {key}: {e}");
      }
      stat.unclosed.push(key);
    }
  }

  info!(
    "extracted {} files, {} chunks, {} bytes into {}",
    stat.files,
    stat.chunks,
    stat.bytes,
    data_dir.display()
  );
  Ok(stat)
}

/// Close what is still open after a failure, background writers included
/// 失败后关闭仍打开的 sink，并等待后台写线程结束
fn abort(sinks: HashMap<String, Sink>) {
  for (key, sink) in sinks {
    if let Err(e) = sink.close() {
      warn!("close {key} after failure: {e}");
    }
  }
}

fn step<R: Read>(
  router: &Router,
  ctx: &Ctx,
  config: &Config,
  sinks: &mut HashMap<String, Sink>,
  chunk: &mut Chunk<'_, R>,
  stat: &mut Stat,
) -> Result<()> {
  if let Kind::Unknown(typ) = chunk.kind() {
    let n = chunk.drain()?;
    debug!("skip ignorable record {typ:#04x} of {} ({n} bytes)", chunk.path());
    return Ok(());
  }

  let route = router.route(chunk.path())?;
  let sink = match sinks.entry(route.key.clone()) {
    Entry::Occupied(e) => e.into_mut(),
    Entry::Vacant(e) => {
      debug!("extracting {}", chunk.path());
      e.insert(Sink::open(&route, ctx)?)
    }
  };
  let flow = sink.process(&route, chunk)?;
  if config.checksum {
    chunk.validate_checksum()?;
  }
  if flow == Flow::Closed {
    sinks.remove(&route.key);
    stat.files += 1;
  }
  Ok(())
}
