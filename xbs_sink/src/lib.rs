#![cfg_attr(docsrs, feature(doc_cfg))]

//! Extract a backup stream onto disk 将备份流解包到磁盘
//!
//! Every stream path gets one [`Sink`] chosen by [`Router`]: a verbatim
//! copy, a decompressing copy, or an incremental delta applied onto the
//! data directory.
//! 每个流路径由 [`Router`] 选择一个 [`Sink`]：原样复制、解压复制，或将增量差异
//! 应用到数据目录。

pub mod conf;
pub mod error;
mod extract;
mod pack;
pub mod pipe;
mod router;
mod sink;

pub use conf::{Conf, Config, default};
pub use error::{Error, Result};
pub use extract::{Stat, extract};
pub use pack::pack;
pub use router::{Route, Router, Target};
pub use sink::{Ctx, Flow, Sink, repair};
pub use xbs_compress::{Codec, Codecs, Decompressor};
