//! CRC32 校验和计算
//!
//! 为段文件头提供校验和计算功能

use crc32fast::Hasher;

/// CRC32 初始值
pub const SEGMENT_CRC32_INIT: u32 = 0;

/// 计算 CRC32 校验和（追加模式）
///
/// # 参数
/// * `crc` - 之前的 CRC 值，首次计算传 [`SEGMENT_CRC32_INIT`]
/// * `data` - 要计算校验和的数据
#[inline]
pub fn crc32_append(crc: u32, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(crc);
    hasher.update(data);
    hasher.finalize()
}
