//! 段文件头校验和

use crate::{
    consts::HDR_OFF_CHECKSUM,
    crc::{crc32_append, SEGMENT_CRC32_INIT},
    types::SegmentHeader,
};

/// 计算文件头校验和
///
/// 校验范围：从开始到 checksum 字段之前的所有字节
pub fn compute_checksum(header: &SegmentHeader) -> u32 {
    let bytes = header.to_bytes();
    crc32_append(SEGMENT_CRC32_INIT, &bytes[..HDR_OFF_CHECKSUM])
}

/// 验证文件头校验和
pub fn verify_checksum(header: &SegmentHeader) -> bool {
    compute_checksum(header) == header.checksum
}

/// 设置文件头校验和
pub fn set_checksum(header: &mut SegmentHeader) {
    header.checksum = compute_checksum(header);
}
