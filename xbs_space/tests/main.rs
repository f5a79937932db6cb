//! Space id catalog tests
//! 表空间 ID 目录测试

use std::{fs, path::Path};

use aok::{OK, Void};
use tempfile::tempdir;
use xbs_page::{FspFlags, Header, PageType, SpaceHeader};
use xbs_space::{Error, SpaceIds};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

fn write_space(root: &Path, rel: &str, id: u32) {
  let mut page = vec![0u8; 1024];
  Header {
    typ: PageType::FspHdr,
    space_id: id,
    ..Default::default()
  }
  .write(&mut page);
  SpaceHeader {
    space_id: id,
    size: 1,
    free_limit: 1,
    flags: FspFlags::new(1024, 0),
  }
  .write(&mut page);
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, page).unwrap();
}

#[test]
fn test_collect_get() -> Void {
  let dir = tempdir()?;
  write_space(dir.path(), "db1/t1.ibd", 10);
  write_space(dir.path(), "db1/t2.ibd", 11);
  write_space(dir.path(), "db2/deep/t3.ibd", 12);
  // Not tablespaces
  // 非表空间文件
  fs::write(dir.path().join("db1/t1.frm"), b"x")?;
  fs::write(dir.path().join("ibdata1"), b"")?;

  let mut ids = SpaceIds::new(dir.path());
  ids.collect()?;
  assert_eq!(ids.len(), 3);
  assert_eq!(ids.get(10)?, Path::new("db1/t1.ibd"));
  assert_eq!(ids.get(12)?, Path::new("db2/deep/t3.ibd"));

  // Lookups are stable
  // 查询结果稳定
  assert_eq!(ids.get(11)?, ids.get(11)?);

  assert!(matches!(ids.get(99), Err(Error::NotFound(99))));

  let mut all: Vec<u32> = ids.iter().map(|(id, _)| id).collect();
  all.sort();
  assert_eq!(all, [10, 11, 12]);
  OK
}

#[test]
fn test_not_collected() {
  let ids = SpaceIds::new("/nonexistent");
  assert!(matches!(ids.get(1), Err(Error::NotCollected)));
  assert!(ids.is_empty());
}

#[test]
fn test_short_file_is_fatal() -> Void {
  let dir = tempdir()?;
  write_space(dir.path(), "ok.ibd", 1);
  fs::write(dir.path().join("bad.ibd"), b"short")?;

  let mut ids = SpaceIds::new(dir.path());
  assert!(matches!(ids.collect(), Err(Error::Decode { .. })));
  assert!(matches!(ids.get(1), Err(Error::NotCollected)));
  OK
}

#[test]
fn test_missing_root() {
  let mut ids = SpaceIds::new("/nonexistent/xbs/root");
  assert!(matches!(ids.collect(), Err(Error::Walk(_))));
}

#[test]
fn test_check() -> Void {
  let dir = tempdir()?;
  let mut ids = SpaceIds::new(dir.path());
  ids.collect()?;

  // Created after collect
  // collect 之后创建
  write_space(dir.path(), "db/new.ibd", 33);
  assert!(matches!(ids.get(33), Err(Error::NotFound(33))));
  ids.check(33, "db/new.ibd")?;

  assert!(matches!(ids.check(34, "db/new.ibd"), Err(Error::NotFound(34))));
  assert!(matches!(ids.check(33, "db/missing.ibd"), Err(Error::NotFound(33))));
  assert!(matches!(ids.check(33, "../escape.ibd"), Err(Error::Fs(_))));
  OK
}
