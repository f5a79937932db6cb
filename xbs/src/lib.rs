#![cfg_attr(docsrs, feature(doc_cfg))]

//! xbs - Physical backup stream engine
//! xbs - 物理备份流引擎
//!
//! Unpacks chunked backup streams onto disk: plain copies, sparse files,
//! compressed members, and incremental page deltas applied in place.
//! 将分块备份流解包到磁盘：普通复制、稀疏文件、压缩成员，以及就地应用的增量页差异。
//!
//! ```no_run
//! use xbs::{Codecs, Conf, extract};
//!
//! let src = std::fs::File::open("backup.xbstream")?;
//! let stat = extract(src, "/var/lib/mysql", &[Conf::Decompress], &Codecs::default())?;
//! assert!(stat.unclosed.is_empty());
//! # Ok::<(), xbs::Error>(())
//! ```

pub use xbs_compress as compress;
pub use xbs_delta as delta;
pub use xbs_fs as fs;
pub use xbs_page as page;
pub use xbs_sink::{
  Codec, Codecs, Conf, Config, Decompressor, Error, Flow, Result, Stat, extract, pack,
};
pub use xbs_space as space;
pub use xbs_stream as stream;
