use std::fmt;

use log::debug;
use xbs_page::consts::valid_page_size;

use crate::{Error, Result};

/// Delta sidecar 差异元数据
///
/// ```text
/// page_size = 16384
/// zip_size = 0
/// space_id = 5
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Meta {
  pub page_size: u32,
  /// Compressed page size, 0 when uncompressed
  /// 压缩页大小，未压缩为 0
  pub zip_size: u32,
  pub space_id: u32,
  pub space_flags: u32,
}

impl Meta {
  pub fn parse(raw: &[u8]) -> Result<Self> {
    let txt = std::str::from_utf8(raw).map_err(|_| Error::Utf8)?;
    let mut page_size = None;
    let mut space_id = None;
    let mut meta = Self::default();

    for line in txt.lines() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      let Some((key, val)) = line.split_once('=') else {
        return Err(Error::Line(line.into()));
      };
      let (key, val) = (key.trim(), val.trim());
      match key {
        "page_size" => page_size = Some(num("page_size", val)?),
        "zip_size" => meta.zip_size = num("zip_size", val)?,
        "space_id" => space_id = Some(num("space_id", val)?),
        "space_flags" => meta.space_flags = num("space_flags", val)?,
        _ => debug!("meta: skip {key}"),
      }
    }

    meta.page_size = page_size.ok_or(Error::Missing("page_size"))?;
    meta.space_id = space_id.ok_or(Error::Missing("space_id"))?;
    if !valid_page_size(meta.page_size) {
      return Err(Error::PageSize(meta.page_size));
    }
    Ok(meta)
  }

  /// Pages listed by a full (non-last) block
  #[inline]
  pub fn capacity(&self) -> usize {
    crate::capacity(self.page_size)
  }
}

fn num(key: &'static str, val: &str) -> Result<u32> {
  val.parse().map_err(|_| Error::Value {
    key,
    val: val.into(),
  })
}

impl fmt::Display for Meta {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "page_size = {}", self.page_size)?;
    writeln!(f, "zip_size = {}", self.zip_size)?;
    writeln!(f, "space_id = {}", self.space_id)?;
    writeln!(f, "space_flags = {}", self.space_flags)
  }
}
