use crate::{Error, Result};

/// More blocks follow 后续还有块
pub const MARKER_MORE: &[u8; 4] = b"xtra";

/// Last block 最后一块
pub const MARKER_LAST: &[u8; 4] = b"XTRA";

/// Page list terminator 页号列表结束符
pub const PAGE_END: u32 = 0xFFFF_FFFF;

/// Page numbers a block header can hold (the marker takes one slot)
/// 块头可容纳的页号数（标记占一个槽）
#[inline]
pub const fn capacity(page_size: u32) -> usize {
  page_size as usize / 4 - 1
}

/// Decoded block header 块头
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
  pub last: bool,
  pub pages: Vec<u32>,
}

impl Block {
  /// Decode a page-sized block header 解码页大小的块头
  pub fn parse(head: &[u8], page_size: u32) -> Result<Self> {
    if head.len() != page_size as usize {
      return Err(Error::HeadLen {
        len: head.len(),
        page_size,
      });
    }
    let marker: [u8; 4] = [head[0], head[1], head[2], head[3]];
    let last = match &marker {
      MARKER_LAST => true,
      MARKER_MORE => false,
      _ => return Err(Error::Marker(marker)),
    };

    let pages: Vec<u32> = head[4..]
      .chunks_exact(4)
      .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
      .take_while(|&n| n != PAGE_END)
      .collect();

    let expect = capacity(page_size);
    if !last && pages.len() != expect {
      return Err(Error::Count {
        count: pages.len(),
        expect,
      });
    }
    Ok(Self { last, pages })
  }

  /// Encode into a page-sized header 编码为页大小的块头
  pub fn write(&self, page_size: u32) -> Result<Vec<u8>> {
    let expect = capacity(page_size);
    if self.pages.len() > expect || (!self.last && self.pages.len() != expect) {
      return Err(Error::Count {
        count: self.pages.len(),
        expect,
      });
    }
    let mut head = vec![0u8; page_size as usize];
    head[..4].copy_from_slice(if self.last { MARKER_LAST } else { MARKER_MORE });
    let mut pos = 4;
    for n in &self.pages {
      head[pos..pos + 4].copy_from_slice(&n.to_be_bytes());
      pos += 4;
    }
    if pos < head.len() {
      head[pos..pos + 4].copy_from_slice(&PAGE_END.to_be_bytes());
    }
    Ok(head)
  }
}

/// Single-block delta holding at most one page
///
/// Written to the incremental directory so the prepare step re-applies
/// the page and handles renames itself.
/// 写入增量目录的单块差异，最多包含一页，由 prepare 阶段重放并处理改名。
pub fn minimal(page_size: u32, page: Option<(u32, &[u8])>) -> Vec<u8> {
  let ps = page_size as usize;
  let mut raw = vec![0u8; ps + page.map_or(0, |_| ps)];
  raw[..4].copy_from_slice(MARKER_LAST);
  let mut pos = 4;
  if let Some((no, body)) = page {
    raw[4..8].copy_from_slice(&no.to_be_bytes());
    pos = 8;
    let n = body.len().min(ps);
    raw[ps..ps + n].copy_from_slice(&body[..n]);
  }
  raw[pos..pos + 4].copy_from_slice(&PAGE_END.to_be_bytes());
  raw
}

/// Full delta for `(page_no, page)` pairs, split into blocks
/// 将 `(页号, 页)` 列表编码为完整差异
pub fn build(page_size: u32, pages: &[(u32, &[u8])]) -> Result<Vec<u8>> {
  let ps = page_size as usize;
  let cap = capacity(page_size);
  let mut out = Vec::new();
  let mut groups: Vec<&[(u32, &[u8])]> = pages.chunks(cap).collect();
  if groups.is_empty() {
    groups.push(&[]);
  }
  let n = groups.len();
  for (i, group) in groups.into_iter().enumerate() {
    let block = Block {
      last: i + 1 == n,
      pages: group.iter().map(|(no, _)| *no).collect(),
    };
    out.extend_from_slice(&block.write(page_size)?);
    for (_, body) in group {
      let start = out.len();
      out.resize(start + ps, 0);
      let len = body.len().min(ps);
      out[start..start + len].copy_from_slice(&body[..len]);
    }
  }
  Ok(out)
}
