//! 输出渲染模块
//!
//! 把书时间轴写成CSV标记表和/或REAPER工程文件。

pub mod markers;
pub mod reaper;

use std::path::{Path, PathBuf};

pub use markers::{markers_file_name, write_markers, write_markers_file};
pub use reaper::{ReaperProject, project_file_name, write_project_file};

use crate::daisy::config::OutputFormat;
use crate::daisy::error::Result;
use crate::daisy::timeline::BookTimeline;

/// 按输出格式在书目录中写出所有产物
///
/// # 返回值
/// 写出的文件路径列表
pub fn write_outputs(timeline: &BookTimeline, book_directory: &Path, format: OutputFormat) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if format.writes_markers() {
        written.push(write_markers_file(timeline, book_directory)?);
    }
    if format.writes_project() {
        written.push(write_project_file(timeline, book_directory)?);
    }
    Ok(written)
}
