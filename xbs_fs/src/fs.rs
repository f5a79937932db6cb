//! Destination file helpers
//! 目标文件工具
//!
//! Stream paths are untrusted: every helper joins them under a root
//! directory through [`safe_join`].
//! 流中路径不可信：所有工具都经 [`safe_join`] 拼接到根目录下。

use std::{
  fs::{self, File, OpenOptions},
  io::Write,
  path::{Component, Path, PathBuf},
};

use log::warn;

use crate::{Error, Result};

/// Join a relative stream path under `root`, rejecting escapes
/// 将流内相对路径拼接到 `root` 下，拒绝越界
pub fn safe_join(root: &Path, rel: impl AsRef<Path>) -> Result<PathBuf> {
  let rel = rel.as_ref();
  let mut out = root.to_path_buf();
  let mut depth = 0usize;
  for c in rel.components() {
    match c {
      Component::Normal(p) => {
        out.push(p);
        depth += 1;
      }
      Component::CurDir => {}
      _ => {
        depth = 0;
        break;
      }
    }
  }
  if depth == 0 {
    warn!("reject stream path {rel:?}");
    return Err(Error::Path(rel.to_string_lossy().into()));
  }
  Ok(out)
}

fn mkdir_parent(path: &Path) -> Result<()> {
  if let Some(dir) = path.parent() {
    fs::create_dir_all(dir)?;
  }
  Ok(())
}

/// Create (truncate) `root/rel` for read-write, making parent dirs
/// 创建（截断）`root/rel` 用于读写，自动创建父目录
pub fn create(root: &Path, rel: impl AsRef<Path>) -> Result<File> {
  let path = safe_join(root, rel)?;
  mkdir_parent(&path)?;
  Ok(
    OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(true)
      .open(path)?,
  )
}

/// Open `root/rel` for read-write without truncation, create if missing
/// 以读写方式打开 `root/rel`，不截断，不存在则创建
pub fn open_rw(root: &Path, rel: impl AsRef<Path>) -> Result<File> {
  let path = safe_join(root, rel)?;
  mkdir_parent(&path)?;
  Ok(
    OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(path)?,
  )
}

/// Write whole buffer to `root/rel`, replacing existing content
/// 将整个缓冲写入 `root/rel`，覆盖原内容
pub fn write_file(root: &Path, rel: impl AsRef<Path>, data: &[u8]) -> Result<()> {
  let mut file = create(root, rel)?;
  file.write_all(data)?;
  file.flush()?;
  Ok(())
}
