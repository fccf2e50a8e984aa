//! REAPER区域标记表（CSV）

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::daisy::error::Result;
use crate::daisy::sanitize::make_safe_filename;
use crate::daisy::timecode::format_seconds;
use crate::daisy::timeline::BookTimeline;

/// 标记表的表头，最后一列为空
pub const MARKER_HEADER: [&str; 6] = ["#", "Name", "Start", "End", "Length", ""];

/// 标记表文件名：`{序号:02} - {书名}_markers.csv`
pub fn markers_file_name(timeline: &BookTimeline) -> String {
    make_safe_filename(&format!("{:02} - {}_markers.csv", timeline.index, timeline.title))
}

/// 按片段顺序写出标记表，每个片段一行
///
/// `Name` 列是行号直接接上片段标识，例如 `10 - 1`。
pub fn write_markers<W: Write>(timeline: &BookTimeline, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(MARKER_HEADER)?;

    for (position, segment) in timeline.segments().enumerate() {
        let number = position + 1;
        csv_writer.write_record([
            format!("r{}", number),
            format!("{}{}", number, segment.identifier),
            format_seconds(segment.start),
            format_seconds(segment.end),
            format_seconds(segment.length()),
            String::new(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// 在书目录中写出标记表，返回文件路径
pub fn write_markers_file(timeline: &BookTimeline, book_directory: &Path) -> Result<PathBuf> {
    let path = book_directory.join(markers_file_name(timeline));
    write_markers(timeline, File::create(&path)?)?;
    Ok(path)
}
