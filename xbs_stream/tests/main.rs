//! xbs_stream tests
//! xbs_stream 测试

use std::io::Read;

use aok::{OK, Void};
use xbs_stream::{Error, FLAG_IGNORABLE, Kind, MAGIC, Reader, Sparse, Writer};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

/// Two files, `hello\n` and `world\n`, one payload and one EOF record each
/// 两个文件各含一个负载记录和一个 EOF 记录
const TWO_FILES: &str = "\
58 42 53 54 43 4b 30 31 00 50 09 00 00 00 74 65 73 74 31 2e 74 78 74 06 00 00 00 00 00 00 00 00 \
00 00 00 00 00 00 00 20 30 3a 36 68 65 6c 6c 6f 0a 58 42 53 54 43 4b 30 31 00 45 09 00 00 00 74 \
65 73 74 31 2e 74 78 74 58 42 53 54 43 4b 30 31 00 50 09 00 00 00 74 65 73 74 32 2e 74 78 74 06 \
00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 a8 61 38 dd 77 6f 72 6c 64 0a 58 42 53 54 43 4b 30 \
31 00 45 09 00 00 00 74 65 73 74 32 2e 74 78 74";

fn unhex(s: &str) -> Vec<u8> {
  s.split_whitespace()
    .map(|b| u8::from_str_radix(b, 16).unwrap())
    .collect()
}

fn read_all(bin: &[u8]) -> xbs_stream::Result<Vec<(Kind, String, u64, Vec<u8>)>> {
  let mut reader = Reader::new(bin, true);
  let mut li = Vec::new();
  while let Some(mut chunk) = reader.next()? {
    let mut body = Vec::new();
    chunk.read_to_end(&mut body)?;
    chunk.validate_checksum()?;
    li.push((chunk.kind(), chunk.path().to_owned(), chunk.offset(), body));
  }
  Ok(li)
}

#[test]
fn test_read_two_files() -> Void {
  let bin = unhex(TWO_FILES);
  let mut reader = Reader::new(&bin[..], true);

  let mut chunk = reader.next()?.unwrap();
  assert_eq!(chunk.kind(), Kind::Payload);
  assert_eq!(chunk.path(), "test1.txt");
  assert_eq!(chunk.payload_len(), 6);
  assert_eq!(chunk.offset(), 0);
  assert_eq!(chunk.head.checksum, 0x363a3020);
  let mut body = String::new();
  chunk.read_to_string(&mut body)?;
  assert_eq!(body, "hello\n");
  chunk.validate_checksum()?;

  let chunk = reader.next()?.unwrap();
  assert!(chunk.head.is_eof());
  assert_eq!(chunk.path(), "test1.txt");
  chunk.validate_checksum()?;

  let li = read_all(&bin)?;
  assert_eq!(li.len(), 4);
  assert_eq!(li[2].1, "test2.txt");
  assert_eq!(li[2].3, b"world\n");
  assert_eq!(li[3].0, Kind::Eof);
  OK
}

#[test]
fn test_write_two_files() -> Void {
  let mut w = Writer::new(Vec::new());
  w.file("test1.txt", b"hello\n", 1024)?;
  w.file("test2.txt", b"world\n", 1024)?;
  assert_eq!(w.pos(), unhex(TWO_FILES).len() as u64);
  assert_eq!(w.into_inner(), unhex(TWO_FILES));
  OK
}

#[test]
fn test_end_of_stream() -> Void {
  let mut reader = Reader::new(&[][..], true);
  assert!(reader.next()?.is_none());
  assert_eq!(reader.pos(), 0);
  OK
}

#[test]
fn test_checksum_mismatch() -> Void {
  let mut bin = unhex(TWO_FILES);
  // first byte of "hello"
  bin[43] ^= 0x20;
  let mut reader = Reader::new(&bin[..], true);
  let mut chunk = reader.next()?.unwrap();
  chunk.drain()?;
  assert!(matches!(
    chunk.validate_checksum(),
    Err(Error::Checksum {
      expected: 0x363a3020,
      ..
    })
  ));

  // Same stream reads fine without validation
  // 不校验时同样的流可以正常读取
  let mut reader = Reader::new(&bin[..], false);
  let mut chunk = reader.next()?.unwrap();
  let mut body = Vec::new();
  chunk.read_to_end(&mut body)?;
  assert_eq!(body, b"Hello\n");
  assert!(matches!(chunk.validate_checksum(), Err(Error::ChecksumOff)));
  OK
}

#[test]
fn test_validate_before_drain() -> Void {
  let bin = unhex(TWO_FILES);
  let mut reader = Reader::new(&bin[..], true);
  let mut chunk = reader.next()?.unwrap();
  let mut two = [0u8; 2];
  chunk.read_exact(&mut two)?;
  assert_eq!(chunk.left(), 4);
  assert!(matches!(chunk.validate_checksum(), Err(Error::Unread(4))));
  assert_eq!(chunk.drain()?, 4);
  chunk.validate_checksum()?;
  OK
}

#[test]
fn test_bad_magic() {
  let mut bin = unhex(TWO_FILES);
  bin[7] = b'2';
  let mut reader = Reader::new(&bin[..], true);
  assert!(matches!(reader.next(), Err(Error::Magic { offset: 0 })));
}

#[test]
fn test_truncated() -> Void {
  let bin = unhex(TWO_FILES);

  let mut reader = Reader::new(&bin[..5], true);
  assert!(matches!(reader.next(), Err(Error::Truncated { offset: 5 })));

  // Inside the path 路径中途截断
  let mut reader = Reader::new(&bin[..20], true);
  assert!(matches!(reader.next(), Err(Error::Truncated { offset: 14 })));

  // Inside the payload 负载中途截断
  let mut reader = Reader::new(&bin[..45], true);
  let mut chunk = reader.next()?.unwrap();
  let mut body = Vec::new();
  let err = chunk.read_to_end(&mut body).unwrap_err();
  assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
  OK
}

#[test]
fn test_unknown_type() -> Void {
  let mut w = Writer::new(Vec::new());
  w.raw(FLAG_IGNORABLE, b'X', "skip.me")?;
  w.file("t.txt", b"abc", 2)?;
  let li = read_all(&w.into_inner())?;
  assert_eq!(li[0].0, Kind::Unknown(b'X'));
  assert_eq!(li[1].3, b"ab");
  assert_eq!(li[2].2, 2);
  assert_eq!(li[3].0, Kind::Eof);

  let mut w = Writer::new(Vec::new());
  w.raw(0, b'X', "fatal")?;
  let bin = w.into_inner();
  let mut reader = Reader::new(&bin[..], true);
  assert!(matches!(
    reader.next(),
    Err(Error::UnknownType {
      typ: b'X',
      offset: 0
    })
  ));
  OK
}

#[test]
fn test_path_len() {
  let mut bin = MAGIC.to_vec();
  bin.extend_from_slice(&[0, b'P']);
  bin.extend_from_slice(&513u32.to_le_bytes());
  bin.extend_from_slice(&[b'a'; 513]);
  let mut reader = Reader::new(&bin[..], true);
  assert!(matches!(
    reader.next(),
    Err(Error::PathLen { len: 513, offset: 0 })
  ));

  let mut w = Writer::new(Vec::new());
  assert!(matches!(
    w.eof(&"a".repeat(513)),
    Err(Error::PathLen { len: 513, .. })
  ));
  assert_eq!(w.pos(), 0);
}

fn sparse_head(count: u32, payload_len: u64, map: &[(u32, u32)]) -> Vec<u8> {
  let mut bin = MAGIC.to_vec();
  bin.extend_from_slice(&[0, b'S']);
  bin.extend_from_slice(&1u32.to_le_bytes());
  bin.push(b'a');
  bin.extend_from_slice(&count.to_le_bytes());
  bin.extend_from_slice(&payload_len.to_le_bytes());
  bin.extend_from_slice(&0u64.to_le_bytes());
  bin.extend_from_slice(&0u32.to_le_bytes());
  for (skip, write) in map {
    bin.extend_from_slice(&skip.to_le_bytes());
    bin.extend_from_slice(&write.to_le_bytes());
  }
  bin
}

#[test]
fn test_sparse_rejects() {
  let bin = sparse_head(0, 0, &[]);
  let mut reader = Reader::new(&bin[..], true);
  assert!(matches!(
    reader.next(),
    Err(Error::SparseLen { len: 0, offset: 0 })
  ));

  let bin = sparse_head(u32::MAX, 0, &[]);
  let mut reader = Reader::new(&bin[..], true);
  assert!(matches!(
    reader.next(),
    Err(Error::SparseLen { len: -1, .. })
  ));

  let mut bin = sparse_head(1, 4, &[(0, 3)]);
  bin.extend_from_slice(b"abcd");
  let mut reader = Reader::new(&bin[..], true);
  assert!(matches!(
    reader.next(),
    Err(Error::SparseSum {
      sum: 3,
      payload_len: 4,
      ..
    })
  ));
}

/// Rebuild a file image from sparse-aware records
/// 根据稀疏记录重建文件内容
fn rebuild(bin: &[u8]) -> xbs_stream::Result<Vec<u8>> {
  let mut out = Vec::new();
  let mut reader = Reader::new(bin, true);
  while let Some(mut chunk) = reader.next()? {
    if chunk.head.is_eof() {
      continue;
    }
    let mut pos = chunk.offset() as usize;
    let map: Vec<Sparse> = if chunk.sparse().is_empty() {
      vec![Sparse {
        skip: 0,
        write: chunk.payload_len() as u32,
      }]
    } else {
      chunk.sparse().to_vec()
    };
    for s in map {
      pos += s.skip as usize;
      let end = pos + s.write as usize;
      if out.len() < end {
        out.resize(end, 0);
      }
      chunk.read_exact(&mut out[pos..end])?;
      pos = end;
    }
    chunk.validate_checksum()?;
  }
  Ok(out)
}

#[test]
fn test_sparse_file() -> Void {
  let mut data = vec![0u8; 64 * 1024];
  fastrand::fill(&mut data[100..200]);
  data[20_000..20_010].fill(9);
  data[40_000] = 1;

  let mut w = Writer::new(Vec::new());
  w.sparse_file("db/t1.ibd", &data, 16 * 1024, 4096)?;
  let bin = w.into_inner();
  assert!(bin.len() < data.len() / 2);

  let mut reader = Reader::new(&bin[..], true);
  let chunk = reader.next()?.unwrap();
  assert_eq!(chunk.kind(), Kind::Sparse);
  assert_eq!(chunk.sparse()[0], Sparse { skip: 0, write: 4096 });
  drop(chunk);

  assert_eq!(rebuild(&bin)?, data);
  OK
}

#[test]
fn test_sparse_all_zero_tail() -> Void {
  let mut data = vec![0u8; 10_000];
  data[0] = 1;
  let mut w = Writer::new(Vec::new());
  w.sparse_file("z", &data, 4096, 1024)?;
  assert_eq!(rebuild(&w.into_inner())?, data);
  OK
}

mod prop {
  use proptest::prelude::*;
  use xbs_stream::Writer;

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn split_and_join(
      path in "[a-z]{1,8}/[a-z]{1,8}\\.ibd",
      data in proptest::collection::vec(any::<u8>(), 0..4096),
      chunk_size in 1usize..1024,
    ) {
      let mut w = Writer::new(Vec::new());
      w.file(&path, &data, chunk_size).unwrap();
      let li = super::read_all(&w.into_inner()).unwrap();
      prop_assert_eq!(li.len(), data.len().div_ceil(chunk_size) + 1);
      let joined: Vec<u8> = li.iter().flat_map(|r| r.3.iter().copied()).collect();
      prop_assert_eq!(joined, data);
      prop_assert!(li.iter().all(|r| r.1 == path));
    }
  }
}
