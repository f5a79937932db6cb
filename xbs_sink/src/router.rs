//! Stream path to sink routing 流路径到 sink 的路由

use std::sync::Arc;

use xbs_compress::{Codecs, Decompressor, is_known};

use crate::{Config, Error, Result};

/// Member role 成员角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  Copy,
  /// `<file>.meta` of an incremental delta 增量差异的 `<file>.meta`
  Meta,
  /// `<file>.delta`
  Delta,
}

/// Routing decision for one stream path 单个流路径的路由结果
#[derive(Clone)]
pub struct Route {
  /// Sink key, also the output path relative to its directory
  /// sink 键，亦是相对输出目录的路径
  pub key: String,
  pub target: Target,
  pub codec: Option<Arc<dyn Decompressor>>,
}

impl std::fmt::Debug for Route {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Route")
      .field("key", &self.key)
      .field("target", &self.target)
      .field("codec", &self.codec.as_ref().map(|c| c.ext()))
      .finish()
  }
}

pub struct Router<'a> {
  config: &'a Config,
  codecs: &'a Codecs,
}

impl<'a> Router<'a> {
  #[inline]
  pub fn new(config: &'a Config, codecs: &'a Codecs) -> Self {
    Self { config, codecs }
  }

  pub fn route(&self, path: &str) -> Result<Route> {
    if path.ends_with(".xbcrypt") {
      return Err(Error::Encrypted(path.into()));
    }

    let mut key = path;
    let mut codec = None;
    if self.config.decompress {
      if let Some((stem, ext)) = path.rsplit_once('.') {
        // registered suffixes decode, known ones without a decoder fail
        // 已注册后缀解码，已知但无解码器的后缀报错
        match self.codecs.get(ext) {
          Some(c) => {
            codec = Some(c);
            key = stem;
          }
          None if is_known(ext) => return Err(Error::NoDecompressor(ext.into())),
          None => {}
        }
      }
    }

    let mut target = Target::Copy;
    if self.config.apply_diff {
      if let Some(stem) = key.strip_suffix(".meta") {
        target = Target::Meta;
        key = stem;
      } else if let Some(stem) = key.strip_suffix(".delta") {
        target = Target::Delta;
        key = stem;
      }
    }

    Ok(Route {
      key: key.into(),
      target,
      codec,
    })
  }
}
