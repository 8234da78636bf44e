//! 基于文件路径的打开与关闭
//!
//! 工具通常为段缓存创建一个私有的临时文件：一次调用完成创建、格式化和初始化，
//! 结束时写回、关闭并删除文件。

use crate::{
    cache::Segment,
    error::Result,
    header::format_nofill,
    types::SegmentOptions,
};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// 创建（或截断）`path`，格式化为段文件并初始化缓存
///
/// 段数据不预先写入，由文件系统保证读出为 0。
pub fn open<P: AsRef<Path>>(
    path: P,
    rows: u64,
    cols: u64,
    tile_rows: u32,
    tile_cols: u32,
    element_size: u32,
    options: SegmentOptions,
) -> Result<Segment<File>> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path.as_ref())?;
    log::debug!("[SEGMENT] open {}", path.as_ref().display());
    let config = format_nofill(&mut file, rows, cols, tile_rows, tile_cols, element_size)?;
    Segment::with_config(file, config, options)
}

/// 打开一个已经格式化的段文件
pub fn open_existing<P: AsRef<Path>>(path: P, options: SegmentOptions) -> Result<Segment<File>> {
    let file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;
    Segment::init(file, options)
}

impl Segment<File> {
    /// 写回所有脏段，关闭并删除段文件
    pub fn close<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let file = self.release()?;
        drop(file);
        std::fs::remove_file(path.as_ref())?;
        log::debug!("[SEGMENT] closed and removed {}", path.as_ref().display());
        Ok(())
    }
}
