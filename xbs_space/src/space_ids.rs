//! Space id to tablespace file map
//! 表空间 ID 到文件的映射

use std::{
  collections::HashMap,
  fs::File,
  io::{self, Read},
  path::{Path, PathBuf},
};

use log::{debug, info};
use walkdir::WalkDir;
use xbs_fs::safe_join;
use xbs_page::{SpaceHeader, consts::SPACE_HEADER_END};

use crate::{Error, Result};

/// Tablespace file extension 表空间文件扩展名
pub const EXT: &str = "ibd";

/// Space id catalog, paths relative to root
/// 表空间 ID 目录，路径相对于根目录
#[derive(Debug)]
pub struct SpaceIds {
  root: PathBuf,
  map: Option<HashMap<u32, PathBuf>>,
}

/// Read the space id from page 0 of a tablespace file
/// 从表空间文件第 0 页读取表空间 ID
fn read_space_id(path: &Path) -> Result<u32> {
  let mut head = [0u8; SPACE_HEADER_END];
  let mut file = File::open(path)?;
  if let Err(e) = file.read_exact(&mut head) {
    if e.kind() == io::ErrorKind::UnexpectedEof {
      let len = file.metadata()?.len();
      return Err(Error::Decode {
        path: path.to_path_buf(),
        source: xbs_page::Error::Short(len),
      });
    }
    return Err(e.into());
  }
  Ok(SpaceHeader::read(&head).space_id)
}

impl SpaceIds {
  #[inline]
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      map: None,
    }
  }

  #[inline]
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Walk root once and record every tablespace file
  /// 遍历根目录一次，记录每个表空间文件
  pub fn collect(&mut self) -> Result<()> {
    let mut map = HashMap::new();
    for entry in WalkDir::new(&self.root).follow_links(false) {
      let entry = entry?;
      if !entry.file_type().is_file() || entry.path().extension().is_none_or(|e| e != EXT) {
        continue;
      }
      let path = entry.path();
      let id = read_space_id(path)?;
      let rel = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
      debug!("space {id} -> {}", rel.display());
      map.insert(id, rel);
    }
    info!("collected {} tablespaces under {}", map.len(), self.root.display());
    self.map = Some(map);
    Ok(())
  }

  /// Relative path holding `id`
  /// 持有 `id` 的相对路径
  pub fn get(&self, id: u32) -> Result<&Path> {
    self
      .map
      .as_ref()
      .ok_or(Error::NotCollected)?
      .get(&id)
      .map(PathBuf::as_path)
      .ok_or(Error::NotFound(id))
  }

  /// Check whether `root/rel` holds space `id`
  /// 检查 `root/rel` 是否持有表空间 `id`
  pub fn check(&self, id: u32, rel: impl AsRef<Path>) -> Result<()> {
    let path = safe_join(&self.root, rel)?;
    match read_space_id(&path) {
      Ok(found) if found == id => Ok(()),
      Ok(found) => {
        debug!("{} holds space {found}, not {id}", path.display());
        Err(Error::NotFound(id))
      }
      Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(id)),
      Err(Error::Decode { .. }) => Err(Error::NotFound(id)),
      Err(e) => Err(e),
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.map.as_ref().map_or(0, HashMap::len)
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Iterate collected (id, path) pairs
  /// 遍历已收集的 (id, path)
  pub fn iter(&self) -> impl Iterator<Item = (u32, &Path)> {
    self
      .map
      .iter()
      .flat_map(|m| m.iter())
      .map(|(&id, p)| (id, p.as_path()))
  }
}
