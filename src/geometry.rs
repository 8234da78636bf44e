//! 段寻址
//!
//! 把矩阵中的逻辑坐标 `(row, col)` 映射为 `(段号, 段内元素下标)`，以及反向映射。
//!
//! ```text
//! segment = (row / tile_rows) * tiles_per_row + (col / tile_cols)
//! offset  = (row % tile_rows) * tile_cols     + (col % tile_cols)
//! ```
//!
//! 当段的行列数都是 2 的幂时，除法和取模退化为移位和掩码（快速模式），
//! 两条路径的结果必须逐位一致。

use crate::{
    consts::HEADER_SIZE,
    error::{Error, ErrorKind, Result},
    types::SegmentConfig,
};

impl SegmentConfig {
    /// 检查坐标是否在矩阵范围内
    pub fn check_bounds(&self, row: u64, col: u64) -> Result<()> {
        if row >= self.rows {
            log::warn!("[SEGMENT] row {} out of range (rows={})", row, self.rows);
            return Err(Error::new(ErrorKind::OutOfBounds, "Row out of range"));
        }
        if col >= self.cols {
            log::warn!("[SEGMENT] col {} out of range (cols={})", col, self.cols);
            return Err(Error::new(ErrorKind::OutOfBounds, "Column out of range"));
        }
        Ok(())
    }

    /// 计算坐标所在的段号和段内元素下标
    ///
    /// 调用者负责先做边界检查。
    #[inline]
    pub fn address(&self, row: u64, col: u64) -> (u64, u64) {
        if self.fast_address {
            self.address_fast(row, col)
        } else {
            self.address_generic(row, col)
        }
    }

    /// 通用寻址（除法 + 取模）
    #[inline]
    pub fn address_generic(&self, row: u64, col: u64) -> (u64, u64) {
        let tile_rows = self.tile_rows as u64;
        let tile_cols = self.tile_cols as u64;
        let segment = (row / tile_rows) * self.tiles_per_row + col / tile_cols;
        let offset = (row % tile_rows) * tile_cols + col % tile_cols;
        (segment, offset)
    }

    /// 快速寻址（移位 + 掩码），仅在 `fast_address` 为真时有效
    #[inline]
    pub fn address_fast(&self, row: u64, col: u64) -> (u64, u64) {
        debug_assert!(self.fast_address);
        let segment = (row >> self.row_shift) * self.tiles_per_row + (col >> self.col_shift);
        let offset = ((row & self.row_mask) << self.col_shift) + (col & self.col_mask);
        (segment, offset)
    }

    /// [`address`](Self::address) 的逆运算
    pub fn locate(&self, segment: u64, offset: u64) -> (u64, u64) {
        let tile_rows = self.tile_rows as u64;
        let tile_cols = self.tile_cols as u64;
        let row = (segment / self.tiles_per_row) * tile_rows + offset / tile_cols;
        let col = (segment % self.tiles_per_row) * tile_cols + offset % tile_cols;
        (row, col)
    }

    /// 段内元素在段文件中的字节偏移
    #[inline]
    pub fn seek_offset(&self, segment: u64, index: u64) -> u64 {
        if self.fast_seek {
            HEADER_SIZE + (segment << self.tile_shift) + (index << self.element_shift)
        } else {
            HEADER_SIZE + segment * self.tile_size_bytes + index * self.element_size as u64
        }
    }

    /// 从 `col` 开始到所在段右边界之间的列数
    #[inline]
    pub fn cols_left_in_tile(&self, col: u64) -> u64 {
        let tile_cols = self.tile_cols as u64;
        tile_cols - col % tile_cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn each_cell(config: &SegmentConfig, mut f: impl FnMut(u64, u64)) {
        for row in 0..config.rows {
            for col in 0..config.cols {
                f(row, col);
            }
        }
    }

    #[test]
    fn test_address_known_values() {
        let config = SegmentConfig::new(100, 100, 8, 8, 2).unwrap();
        assert_eq!(config.address(0, 0), (0, 0));
        assert_eq!(config.address(0, 8), (1, 0));
        assert_eq!(config.address(8, 0), (13, 0));
        assert_eq!(config.address(50, 50), (6 * 13 + 6, 2 * 8 + 2));
        // 右下角位于不完整段内
        assert_eq!(config.address(99, 99), (168, 3 * 8 + 3));
    }

    #[test]
    fn test_address_is_bijective() {
        let config = SegmentConfig::new(37, 53, 6, 10, 4).unwrap();
        let mut seen = alloc::collections::BTreeSet::new();
        each_cell(&config, |row, col| {
            let (segment, offset) = config.address(row, col);
            assert!(segment < config.total_segments);
            assert!(offset < config.tile_len);
            assert_eq!(config.locate(segment, offset), (row, col));
            assert!(seen.insert((segment, offset)));
        });
    }

    #[test]
    fn test_fast_matches_generic() {
        for &(rows, cols, tr, tc) in &[(100, 100, 8, 8), (33, 130, 4, 32), (7, 9, 1, 2), (64, 64, 64, 1)] {
            let config = SegmentConfig::new(rows, cols, tr, tc, 2).unwrap();
            assert!(config.fast_address);
            each_cell(&config, |row, col| {
                let fast = config.address_fast(row, col);
                assert_eq!(fast, config.address_generic(row, col));
                assert_eq!(config.locate(fast.0, fast.1), (row, col));
            });
        }
    }

    #[test]
    fn test_seek_offset_fast_and_generic() {
        let fast = SegmentConfig::new(100, 100, 8, 8, 4).unwrap();
        assert!(fast.fast_seek);
        let mut generic = fast;
        generic.fast_seek = false;
        for segment in [0, 1, 17, 168] {
            for index in [0, 1, 63] {
                assert_eq!(fast.seek_offset(segment, index), generic.seek_offset(segment, index));
            }
        }
        assert_eq!(fast.seek_offset(2, 3), HEADER_SIZE + 2 * 256 + 3 * 4);
    }

    #[test]
    fn test_seek_offset_non_power_of_two() {
        let config = SegmentConfig::new(10, 10, 3, 3, 5).unwrap();
        assert!(!config.fast_seek);
        assert_eq!(config.seek_offset(4, 2), HEADER_SIZE + 4 * 45 + 2 * 5);
    }

    #[test]
    fn test_check_bounds() {
        let config = SegmentConfig::new(100, 100, 8, 8, 2).unwrap();
        assert!(config.check_bounds(99, 99).is_ok());
        assert!(config.check_bounds(100, 0).unwrap_err().is_out_of_bounds());
        assert!(config.check_bounds(0, 100).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_cols_left_in_tile() {
        let config = SegmentConfig::new(10, 20, 4, 8, 1).unwrap();
        assert_eq!(config.cols_left_in_tile(0), 8);
        assert_eq!(config.cols_left_in_tile(5), 3);
        assert_eq!(config.cols_left_in_tile(8), 8);
    }
}
