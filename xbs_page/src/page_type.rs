//! Page types 页类型

macro_rules! page_type {
  ($($(#[$doc:meta])* $name:ident = $val:expr),* $(,)?) => {
    /// Page type stored at header offset 24
    /// 页头偏移 24 处的页类型
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum PageType {
      #[default]
      $($(#[$doc])* $name,)*
      /// Value not known to this codec 未知类型值
      Other(u16),
    }

    impl From<u16> for PageType {
      #[inline]
      fn from(v: u16) -> Self {
        match v {
          $($val => Self::$name,)*
          v => Self::Other(v),
        }
      }
    }

    impl From<PageType> for u16 {
      #[inline]
      fn from(t: PageType) -> u16 {
        match t {
          $(PageType::$name => $val,)*
          PageType::Other(v) => v,
        }
      }
    }
  };
}

page_type! {
  /// Freshly allocated 新分配
  Allocated = 0,
  Unused = 1,
  UndoLog = 2,
  /// Index node 索引节点
  Inode = 3,
  IbufFreeList = 4,
  IbufBitmap = 5,
  Sys = 6,
  TrxSys = 7,
  /// File space header, always page 0 表空间头，总是第 0 页
  FspHdr = 8,
  /// Extent descriptor 区描述符
  Xdes = 9,
  Blob = 10,
  Zblob = 11,
  Zblob2 = 12,
  Unknown = 13,
  /// Transparent page compression 透明页压缩
  Compressed = 14,
  Encrypted = 15,
  CompressedEncrypted = 16,
  EncryptedRtree = 17,
  SdiBlob = 18,
  SdiZblob = 19,
  LegacyDblwr = 20,
  RsegArray = 21,
  LobIndex = 22,
  LobData = 23,
  LobFirst = 24,
  ZlobFirst = 25,
  ZlobData = 26,
  ZlobIndex = 27,
  ZlobFrag = 28,
  ZlobFragEntry = 29,
  Sdi = 17853,
  Rtree = 17854,
  Index = 17855,
}
