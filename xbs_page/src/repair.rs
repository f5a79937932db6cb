//! Restore sparse holes of transparently compressed pages
//! 恢复透明压缩页的稀疏空洞

use log::debug;
use xbs_fs::{is_unsupported, punch_hole};

use crate::{Header, PageFile, PageType, Result};

/// Punch holes over the unused tail of every compressed page, returns holes punched
/// 对每个压缩页未使用的尾部打洞，返回打洞数
///
/// Page 0 is never compressed and is skipped. Stops quietly when the
/// filesystem cannot punch holes.
/// 第 0 页从不压缩，跳过。文件系统不支持打洞时静默停止。
pub fn repair_sparse(pf: &PageFile) -> Result<u64> {
  let page_size = pf.page_size();
  let mut buf = vec![0u8; page_size as usize];
  let mut punched = 0u64;
  let mut no = 1u64;

  while pf.read(no, &mut buf)? {
    let header = Header::read(&buf);
    if header.typ == PageType::Compressed {
      let used = header.compressed().used_len();
      if used < page_size {
        let offset = no * page_size as u64 + used as u64;
        match punch_hole(pf.file(), offset, (page_size - used) as u64) {
          Ok(()) => punched += 1,
          Err(e) if is_unsupported(&e) => {
            debug!("punch hole unsupported, stop repair at page {no}");
            return Ok(punched);
          }
          Err(e) => return Err(e.into()),
        }
      }
    }
    no += 1;
  }

  Ok(punched)
}
