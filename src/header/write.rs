//! 段文件格式化

use super::checksum::set_checksum;
use crate::{
    error::{Error, ErrorKind, Result},
    storage::{write_all_at, SegmentStorage},
    types::{SegmentConfig, SegmentHeader},
};
use alloc::vec::Vec;

/// 写入段文件头
pub fn write_header<S: SegmentStorage>(storage: &mut S, config: &SegmentConfig) -> Result<()> {
    let mut header = SegmentHeader::new(config);
    set_checksum(&mut header);
    write_all_at(storage, 0, &header.to_bytes())
}

/// 格式化段文件
///
/// 写入文件头，然后为每个段写入一段全 0 的数据，
/// 保证在首次使用之前每个段地址都可以读写。
///
/// # 参数
///
/// * `storage` - 底层存储（会被截断到精确的文件大小）
/// * `rows`, `cols` - 矩阵大小
/// * `tile_rows`, `tile_cols` - 段大小
/// * `element_size` - 每个元素的字节数
///
/// # 返回
///
/// 成功返回推导出的几何参数
pub fn format<S: SegmentStorage>(
    storage: &mut S,
    rows: u64,
    cols: u64,
    tile_rows: u32,
    tile_cols: u32,
    element_size: u32,
) -> Result<SegmentConfig> {
    let config = SegmentConfig::new(rows, cols, tile_rows, tile_cols, element_size)?;
    log::info!(
        "[FORMAT] {}x{} matrix, {}x{} segments of {} bytes, {} segments",
        rows,
        cols,
        tile_rows,
        tile_cols,
        config.tile_size_bytes,
        config.total_segments
    );

    write_header(storage, &config)?;

    let mut zeros = Vec::new();
    zeros
        .try_reserve_exact(config.tile_bytes())
        .map_err(|_| Error::new(ErrorKind::NoMemory, "Cannot allocate segment buffer"))?;
    zeros.resize(config.tile_bytes(), 0u8);

    for segment in 0..config.total_segments {
        write_all_at(storage, config.seek_offset(segment, 0), &zeros)?;
    }

    storage.set_size(config.file_size())?;
    storage.flush()?;
    Ok(config)
}

/// 格式化段文件，但不写入段数据
///
/// 只写文件头并把文件扩展到完整大小，未写过的区域由存储保证读出为 0。
pub fn format_nofill<S: SegmentStorage>(
    storage: &mut S,
    rows: u64,
    cols: u64,
    tile_rows: u32,
    tile_cols: u32,
    element_size: u32,
) -> Result<SegmentConfig> {
    let config = SegmentConfig::new(rows, cols, tile_rows, tile_cols, element_size)?;
    log::info!(
        "[FORMAT] {}x{} matrix, {}x{} segments, no fill ({} bytes)",
        rows,
        cols,
        tile_rows,
        tile_cols,
        config.file_size()
    );

    write_header(storage, &config)?;
    storage.set_size(config.file_size())?;
    storage.flush()?;
    Ok(config)
}
