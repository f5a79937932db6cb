#![cfg_attr(docsrs, feature(doc_cfg))]

//! Streaming decompressors keyed by file suffix
//! 按文件后缀选择的流式解压器

use std::{
  collections::HashMap,
  io::{self, Read, Write},
  sync::Arc,
};

use thiserror::Error;

/// 压缩错误 Compression error
#[derive(Error, Debug)]
pub enum Error {
  #[error("lz4: {0}")]
  Lz4(#[from] lz4_flex::frame::Error),

  #[error("zstd: {0}")]
  Zstd(std::io::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("unknown codec suffix: {0}")]
  UnknownExt(Box<str>),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Suffixes recognized as compressed, with or without a decoder
/// 识别为压缩的后缀，无论是否有解码器
pub const KNOWN_EXT: [&str; 3] = ["lz4", "zst", "qp"];

#[inline]
pub fn is_known(ext: &str) -> bool {
  KNOWN_EXT.contains(&ext)
}

/// Stream decompressor 流式解压器
pub trait Decompressor: Send + Sync {
  /// File suffix without dot 不含点的文件后缀
  fn ext(&self) -> &'static str;

  fn decompress<'a>(&self, src: Box<dyn Read + Send + 'a>)
  -> io::Result<Box<dyn Read + Send + 'a>>;
}

/// 压缩算法 Compression codec
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Codec {
  /// lz4 frame format
  Lz4 = 1,
  Zstd = 2,
}

impl Codec {
  #[inline]
  pub fn from_ext(ext: &str) -> Result<Self> {
    match ext {
      "lz4" => Ok(Self::Lz4),
      "zst" => Ok(Self::Zstd),
      _ => Err(Error::UnknownExt(ext.into())),
    }
  }

  /// 压缩 Compress
  pub fn enc(self, src: &[u8]) -> Result<Vec<u8>> {
    match self {
      Self::Lz4 => {
        let mut w = lz4_flex::frame::FrameEncoder::new(Vec::new());
        w.write_all(src)?;
        Ok(w.finish()?)
      }
      Self::Zstd => zstd::encode_all(src, 3).map_err(Error::Zstd),
    }
  }

  /// 解压 Decompress
  pub fn dec(self, src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    self
      .decompress(Box::new(src))
      .and_then(|mut r| r.read_to_end(&mut out))
      .map_err(|e| self.io_err(e))?;
    Ok(out)
  }

  /// Attribute a stream error to this codec 将流错误归于本算法
  fn io_err(self, e: io::Error) -> Error {
    match self {
      Self::Lz4 => Error::Io(e),
      Self::Zstd => Error::Zstd(e),
    }
  }
}

impl Decompressor for Codec {
  fn ext(&self) -> &'static str {
    match self {
      Self::Lz4 => "lz4",
      Self::Zstd => "zst",
    }
  }

  fn decompress<'a>(
    &self,
    src: Box<dyn Read + Send + 'a>,
  ) -> io::Result<Box<dyn Read + Send + 'a>> {
    Ok(match self {
      Self::Lz4 => Box::new(lz4_flex::frame::FrameDecoder::new(src)),
      Self::Zstd => Box::new(zstd::Decoder::new(src)?),
    })
  }
}

/// Decompressor table passed to the extractor
/// 传给解包器的解压器表
#[derive(Clone)]
pub struct Codecs {
  map: HashMap<&'static str, Arc<dyn Decompressor>>,
}

impl Codecs {
  /// Empty table 空表
  pub fn new() -> Self {
    Self {
      map: HashMap::new(),
    }
  }

  /// Replaces any decompressor with the same suffix
  /// 覆盖同后缀的解压器
  pub fn register(&mut self, d: Arc<dyn Decompressor>) -> &mut Self {
    self.map.insert(d.ext(), d);
    self
  }

  #[inline]
  pub fn get(&self, ext: &str) -> Option<Arc<dyn Decompressor>> {
    self.map.get(ext).cloned()
  }

  pub fn exts(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.map.keys().copied()
  }
}

impl Default for Codecs {
  /// lz4 and zstd 注册 lz4 与 zstd
  fn default() -> Self {
    let mut codecs = Self::new();
    codecs
      .register(Arc::new(Codec::Lz4))
      .register(Arc::new(Codec::Zstd));
    codecs
  }
}

impl std::fmt::Debug for Codecs {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut exts: Vec<_> = self.exts().collect();
    exts.sort_unstable();
    f.debug_struct("Codecs").field("exts", &exts).finish()
  }
}
