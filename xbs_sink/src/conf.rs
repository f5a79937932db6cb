//! Extraction configuration
//! 解包配置

use std::path::PathBuf;

use crate::{Error, Result};

/// Extraction options 解包选项
#[derive(Debug, Clone)]
pub enum Conf {
  /// Decompress `.lz4` / `.zst` members 解压 `.lz4` / `.zst` 成员
  Decompress,

  /// Directory for incremental files; copies land here instead of the data dir
  /// 增量文件目录；复制的文件写到此处而非数据目录
  Incremental(PathBuf),

  /// Apply `.delta` files onto the data dir, needs [`Conf::Incremental`]
  /// 将 `.delta` 应用到数据目录，需要 [`Conf::Incremental`]
  ApplyDiff,

  /// Validate record checksums 校验记录校验和
  Checksum(bool),

  /// Payload bytes per record when packing 打包时每条记录的负载字节数
  ChunkSize(usize),
}

/// Internal configuration struct
/// 内部配置结构体
#[derive(Debug, Clone)]
pub struct Config {
  pub decompress: bool,
  pub incremental: Option<PathBuf>,
  pub apply_diff: bool,
  pub checksum: bool,
  pub chunk_size: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      decompress: false,
      incremental: None,
      apply_diff: false,
      checksum: default::CHECKSUM,
      chunk_size: default::CHUNK_SIZE,
    }
  }
}

impl From<&[Conf]> for Config {
  fn from(conf_li: &[Conf]) -> Self {
    let mut config = Self::default();
    for conf in conf_li {
      match conf {
        Conf::Decompress => config.decompress = true,
        Conf::Incremental(dir) => config.incremental = Some(dir.clone()),
        Conf::ApplyDiff => config.apply_diff = true,
        Conf::Checksum(v) => config.checksum = *v,
        Conf::ChunkSize(v) => {
          if *v == 0 {
            log::warn!("ChunkSize 0 ignored");
          } else {
            config.chunk_size = *v;
          }
        }
      }
    }
    config
  }
}

impl Config {
  pub fn check(&self) -> Result<()> {
    if self.apply_diff && self.incremental.is_none() {
      return Err(Error::Config("ApplyDiff requires Incremental"));
    }
    Ok(())
  }
}

/// Default values
/// 默认值
pub mod default {
  pub const MB: usize = 1024 * 1024;

  /// Validate checksums 校验校验和
  pub const CHECKSUM: bool = true;

  /// Payload per record when packing 打包时每条记录的负载
  pub const CHUNK_SIZE: usize = 10 * MB;
}
