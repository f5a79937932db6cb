//! 常量定义 Constants

/// 记录魔数 Record magic
pub const MAGIC: &[u8; 8] = b"XBSTCK01";

/// 未知类型可忽略 Unknown type may be skipped
pub const FLAG_IGNORABLE: u8 = 0x01;

/// 最大路径长度 Max path length
pub const MAX_PATH: u32 = 512;

/// 单条记录最大稀疏项数 Max sparse entries per record
pub const MAX_SPARSE: i32 = 1 << 20;

pub(crate) const TYPE_PAYLOAD: u8 = b'P';
pub(crate) const TYPE_SPARSE: u8 = b'S';
pub(crate) const TYPE_EOF: u8 = b'E';
