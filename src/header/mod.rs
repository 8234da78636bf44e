//! 段文件头操作模块
//!
//! 这个模块提供段文件的格式化（写文件头并预分配所有段）、
//! 文件头的读取与验证，以及文件头校验和。

mod read;
mod write;
pub mod checksum;

pub use read::*;
pub use write::*;
