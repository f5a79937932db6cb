//! Per-path file sinks 按路径的文件 sink

mod copy;
mod decompress;
mod diff;

use std::{
  fs::File,
  io::Read,
  path::{Path, PathBuf},
  sync::Arc,
};

use log::{debug, warn};
use xbs_page::{PageFile, repair_sparse};
use xbs_space::SpaceIds;
use xbs_stream::Chunk;

pub use self::{copy::CopySink, decompress::DecompressSink, diff::DiffSink};
use crate::{Error, Result, Route, Target};

/// Outcome of one record 单条记录的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  More,
  /// Only after an end-of-file record 仅在文件结束记录之后
  Closed,
}

/// Shared extraction context 共享解包上下文
#[derive(Debug, Clone)]
pub struct Ctx {
  pub data_dir: PathBuf,
  /// Where copies land: incremental dir if set, else data dir
  /// 复制文件的目标：设置了增量目录则用之，否则为数据目录
  pub out_dir: PathBuf,
  pub incr_dir: Option<PathBuf>,
  pub space_ids: Option<Arc<SpaceIds>>,
}

pub enum Sink {
  Copy(CopySink),
  Decompress(DecompressSink),
  Diff(DiffSink),
}

impl Sink {
  pub fn open(route: &Route, ctx: &Ctx) -> Result<Self> {
    Ok(match (route.target, &route.codec) {
      (Target::Copy, None) => Self::Copy(CopySink::new(&ctx.out_dir, &route.key)?),
      (Target::Copy, Some(codec)) => Self::Decompress(DecompressSink::new(
        &ctx.out_dir,
        &route.key,
        codec.clone(),
      )?),
      (Target::Meta | Target::Delta, _) => {
        let (Some(incr_dir), Some(space_ids)) = (&ctx.incr_dir, &ctx.space_ids) else {
          return Err(Error::Config("diff apply without incremental dir"));
        };
        Self::Diff(DiffSink::new(
          &route.key,
          &ctx.data_dir,
          incr_dir,
          space_ids.clone(),
        ))
      }
    })
  }

  pub fn process<R: Read>(&mut self, route: &Route, chunk: &mut Chunk<'_, R>) -> Result<Flow> {
    match self {
      Self::Copy(s) => {
        same_target(route, Target::Copy)?;
        s.process(chunk)
      }
      Self::Decompress(s) => {
        same_target(route, Target::Copy)?;
        s.process(chunk)
      }
      Self::Diff(s) => s.process(route, chunk),
    }
  }

  /// Close a sink left open at end of stream 关闭流结束时仍未关闭的 sink
  pub fn close(self) -> Result<()> {
    match self {
      Self::Copy(s) => s.close(),
      Self::Decompress(s) => s.close(),
      Self::Diff(s) => s.close(),
    }
  }
}

fn same_target(route: &Route, target: Target) -> Result<()> {
  if route.target != target {
    return Err(Error::Protocol(
      format!("{} mixes plain and delta members", route.key).into(),
    ));
  }
  Ok(())
}

/// Punch holes behind compressed pages of a restored tablespace, returns holes punched
///
/// A file too short to carry a space header is left alone. I/O failures,
/// punch errors other than "unsupported" included, are returned.
/// 对恢复的表空间中压缩页的尾部打洞，返回打洞数。文件过短不足以容纳表空间头时跳过；
/// I/O 失败（含非“不支持”的打洞错误）会返回。
pub fn repair(file: &File, path: &Path, page_size: Option<u32>) -> Result<u64> {
  let r = match page_size {
    Some(ps) => PageFile::new(file, ps),
    None => PageFile::open(file),
  }
  .and_then(|pf| repair_sparse(&pf));
  match r {
    Ok(n) => {
      if n > 0 {
        debug!("{}: {n} pages made sparse", path.display());
      }
      Ok(n)
    }
    Err(e @ (xbs_page::Error::Short(_) | xbs_page::Error::PageSize(_))) => {
      warn!("skip sparse repair of {}: {e}", path.display());
      Ok(0)
    }
    Err(e) => Err(e.into()),
  }
}

#[inline]
pub(crate) fn is_ibd(key: &str) -> bool {
  key.ends_with(".ibd")
}
