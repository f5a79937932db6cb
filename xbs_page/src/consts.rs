//! 常量定义 Constants

/// 最小页大小 Minimal page size
pub const MIN_PAGE_SIZE: u32 = 1024;

/// 最大页大小 Maximal page size
pub const MAX_PAGE_SIZE: u32 = 64 * 1024;

/// 默认页大小 Default page size
pub const DEFAULT_PAGE_SIZE: u32 = 16 * 1024;

/// 页头大小 Page header size
pub const HEADER_SIZE: usize = 38;

/// 页尾大小 Page trailer size
pub const TRAILER_SIZE: usize = 8;

/// 表空间头结束位置 End of the file-space header on page 0
pub const SPACE_HEADER_END: usize = HEADER_SIZE + 20;

/// Whether `n` is a supported page size
/// 是否为支持的页大小
#[inline]
pub const fn valid_page_size(n: u32) -> bool {
  n.is_power_of_two() && n >= MIN_PAGE_SIZE && n <= MAX_PAGE_SIZE
}
