//! Page codec tests
//! 页编解码测试

use std::{fs, io::Write};

use aok::{OK, Void};
use tempfile::tempdir;
use xbs_page::{
  CompressedMeta, DEFAULT_PAGE_SIZE, Error, FspFlags, HEADER_SIZE, Header, PageFile, PageType,
  SpaceHeader, Trailer, repair_sparse,
};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

#[test]
fn test_header_layout() {
  let mut page = vec![0u8; 1024];
  page[0..4].copy_from_slice(&0xDEADBEEFu32.to_be_bytes());
  page[4..8].copy_from_slice(&7u32.to_be_bytes());
  page[8..12].copy_from_slice(&6u32.to_be_bytes());
  page[12..16].copy_from_slice(&8u32.to_be_bytes());
  page[16..24].copy_from_slice(&0x0102030405060708u64.to_be_bytes());
  page[24..26].copy_from_slice(&17855u16.to_be_bytes());
  page[26..34].copy_from_slice(&42u64.to_be_bytes());
  page[34..38].copy_from_slice(&99u32.to_be_bytes());

  let h = Header::read(&page);
  assert_eq!(h.checksum, 0xDEADBEEF);
  assert_eq!(h.page_no, 7);
  assert_eq!(h.prev, 6);
  assert_eq!(h.next, 8);
  assert_eq!(h.lsn, 0x0102030405060708);
  assert_eq!(h.typ, PageType::Index);
  assert_eq!(h.flush_lsn, 42);
  assert_eq!(h.space_id, 99);

  // Not compressed: zero metadata
  // 非压缩页：元数据为零
  assert_eq!(h.compressed(), CompressedMeta::default());

  let mut out = vec![0u8; 1024];
  h.write(&mut out);
  assert_eq!(out[..HEADER_SIZE], page[..HEADER_SIZE]);
}

#[test]
fn test_header_short_is_zero() {
  assert_eq!(Header::read(&[1, 2, 3]), Header::default());
  assert_eq!(Trailer::read(&[1]), Trailer::default());
  assert_eq!(SpaceHeader::read(&[0u8; 40]), SpaceHeader::default());
}

#[test]
fn test_unknown_page_type() {
  let mut page = vec![0u8; 64];
  page[24..26].copy_from_slice(&4242u16.to_be_bytes());
  assert_eq!(Header::read(&page).typ, PageType::Other(4242));
  assert_eq!(u16::from(PageType::Other(4242)), 4242);
  assert_eq!(u16::from(PageType::FspHdr), 8);
}

#[test]
fn test_compressed_meta() {
  let meta = CompressedMeta {
    version: 1,
    algo: 2,
    orig_type: PageType::Index,
    orig_size: 16346,
    compressed_size: 1200,
  };
  let h = Header {
    typ: PageType::Compressed,
    flush_lsn: meta.flush_lsn(),
    ..Default::default()
  };
  let mut page = vec![0u8; 1024];
  h.write(&mut page);

  // Field bytes sit at fixed offsets
  // 字段位于固定偏移
  assert_eq!(page[26], 1);
  assert_eq!(page[27], 2);
  assert_eq!(&page[32..34], &1200u16.to_be_bytes());

  let got = Header::read(&page).compressed();
  assert_eq!(got, meta);
  assert_eq!(got.used_len(), HEADER_SIZE as u32 + 1200);
}

#[test]
fn test_trailer() {
  let mut page = vec![0u8; 1024];
  let t = Trailer {
    checksum: 0x11223344,
    low_lsn: 0x55667788,
  };
  t.write(&mut page);
  assert_eq!(&page[1016..1020], &0x11223344u32.to_be_bytes());
  assert_eq!(Trailer::read(&page), t);
}

#[test]
fn test_fsp_flags() {
  assert_eq!(FspFlags(0).page_size(), DEFAULT_PAGE_SIZE);
  assert_eq!(FspFlags(0).zip_size(), 0);

  for ps in [1024u32, 2048, 4096, 8192, 16384, 32768, 65536] {
    let f = FspFlags::new(ps, 0);
    assert_eq!(f.page_size(), ps, "page size {ps}");
    assert_eq!(f.zip_size(), 0);
  }

  let f = FspFlags::new(16384, 8192);
  assert_eq!(f.zip_size(), 8192);

  let f = FspFlags((1 << 10) | (1 << 13));
  assert!(f.is_data_dir());
  assert!(f.is_encrypted());
  assert!(!f.is_shared());
  assert!(!f.is_temporary());
  assert!(!f.has_sdi());
}

#[test]
fn test_space_header() {
  let sh = SpaceHeader {
    space_id: 12,
    size: 7,
    free_limit: 64,
    flags: FspFlags::new(4096, 0),
  };
  let mut page = vec![0u8; 4096];
  sh.write(&mut page);
  assert_eq!(&page[38..42], &12u32.to_be_bytes());
  assert_eq!(&page[46..50], &7u32.to_be_bytes());
  assert_eq!(SpaceHeader::read(&page), sh);
}

/// Build a tablespace with a compressed page at `no`
/// 构造在 `no` 处含压缩页的表空间
fn tablespace(page_size: u32, pages: u32, compressed: &[(u32, u16)]) -> Vec<u8> {
  let ps = page_size as usize;
  let mut data = vec![0xAAu8; ps * pages as usize];
  for no in 0..pages {
    let page = &mut data[no as usize * ps..(no as usize + 1) * ps];
    let mut h = Header {
      page_no: no,
      space_id: 5,
      typ: PageType::Index,
      ..Default::default()
    };
    if no == 0 {
      h.typ = PageType::FspHdr;
    }
    if let Some(&(_, cs)) = compressed.iter().find(|(n, _)| *n == no) {
      h.typ = PageType::Compressed;
      h.flush_lsn = CompressedMeta {
        version: 1,
        algo: 1,
        orig_type: PageType::Index,
        orig_size: page_size as u16,
        compressed_size: cs,
      }
      .flush_lsn();
    }
    h.write(page);
    if no == 0 {
      SpaceHeader {
        space_id: 5,
        size: pages,
        free_limit: pages,
        flags: FspFlags::new(page_size, 0),
      }
      .write(page);
    }
  }
  data
}

#[test]
fn test_page_file() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("t.ibd");
  let mut data = tablespace(4096, 4, &[]);
  // Partial trailing page is ignored
  // 忽略末尾不完整页
  data.extend_from_slice(&[1, 2, 3]);
  fs::write(&path, &data)?;

  let file = fs::File::open(&path)?;
  let pf = PageFile::open(&file)?;
  assert_eq!(pf.page_size(), 4096);
  assert_eq!(pf.page_count(), 4);

  let mut buf = vec![0u8; 4096];
  assert!(pf.read(3, &mut buf)?);
  assert_eq!(Header::read(&buf).page_no, 3);
  assert!(!pf.read(4, &mut buf)?);
  OK
}

#[test]
fn test_page_file_short() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("tiny.ibd");
  fs::File::create(&path)?.write_all(b"tiny")?;
  let file = fs::File::open(&path)?;
  assert!(matches!(PageFile::open(&file), Err(Error::Short(4))));
  assert!(matches!(PageFile::new(&file, 3000), Err(Error::PageSize(3000))));
  OK
}

#[test]
fn test_repair_sparse() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("c.ibd");
  let ps = 4096u32;
  let data = tablespace(ps, 4, &[(1, 100), (3, 4000)]);
  fs::write(&path, &data)?;

  let file = fs::OpenOptions::new().read(true).write(true).open(&path)?;
  let pf = PageFile::open(&file)?;
  let punched = repair_sparse(&pf)?;
  drop(file);

  let got = fs::read(&path)?;
  assert_eq!(got.len(), data.len());

  // Page 3 is almost full: used 4038 of 4096, so it may be punched as well
  // 第 3 页几乎满：使用 4038/4096，同样可打洞
  if punched > 0 {
    assert_eq!(punched, 2);
    let used = HEADER_SIZE + 100;
    let p1 = &got[ps as usize..2 * ps as usize];
    assert_eq!(p1[..used], data[ps as usize..ps as usize + used]);
    assert!(p1[used..].iter().all(|&b| b == 0));
  } else {
    assert_eq!(got, data);
  }

  // Uncompressed pages stay untouched
  // 非压缩页不受影响
  assert_eq!(got[2 * ps as usize..3 * ps as usize], data[2 * ps as usize..3 * ps as usize]);
  assert_eq!(got[..ps as usize], data[..ps as usize]);
  OK
}
