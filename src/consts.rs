//! 段文件常量定义
//!
//! 这个模块包含段缓存的所有常量定义，包括：
//! - 段文件头布局
//! - 哨兵值
//! - 默认参数

//=============================================================================
// 段文件头
//=============================================================================

/// 段文件魔数
pub const SEGMENT_MAGIC: [u8; 4] = *b"GSEG";

/// 段文件格式版本
pub const SEGMENT_VERSION: u32 = 1;

/// 段文件头大小（字节）
pub const HEADER_SIZE: u64 = 40;

/// 文件头各字段偏移
pub const HDR_OFF_MAGIC: usize = 0;
/// 版本字段偏移
pub const HDR_OFF_VERSION: usize = 4;
/// 总行数字段偏移
pub const HDR_OFF_ROWS: usize = 8;
/// 总列数字段偏移
pub const HDR_OFF_COLS: usize = 16;
/// 段行数字段偏移
pub const HDR_OFF_TILE_ROWS: usize = 24;
/// 段列数字段偏移
pub const HDR_OFF_TILE_COLS: usize = 28;
/// 元素大小字段偏移
pub const HDR_OFF_ELEMENT_SIZE: usize = 32;
/// 校验和字段偏移（校验范围为 0..HDR_OFF_CHECKSUM）
pub const HDR_OFF_CHECKSUM: usize = 36;

//=============================================================================
// 缓存
//=============================================================================

/// 空槽位的段号哨兵
pub const EMPTY_SEGMENT: u64 = u64::MAX;

/// 默认内存中的段数量
pub const DEFAULT_POOL_SIZE: usize = 16;
