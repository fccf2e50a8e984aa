//! REAPER工程文件（.RPP）
//!
//! 整本书放在一条轨道上：每个章节一个媒体项，每个音频片段一个命名标记。

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::daisy::error::Result;
use crate::daisy::sanitize::make_safe_filename;
use crate::daisy::timecode::format_seconds;
use crate::daisy::timeline::BookTimeline;
use crate::daisy::timeline::naming::extension_of;

/// 工程中的一个媒体项
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
    /// 媒体项名称（文件名去掉扩展名）
    pub name: String,
    /// 音频文件（相对工程文件）
    pub file: String,
    /// 在时间轴上的位置
    pub position: Decimal,
    /// 长度
    pub length: Decimal,
}

/// 工程中的一个标记
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMarker {
    /// 标记序号（从1开始）
    pub index: usize,
    /// 位置
    pub position: Decimal,
    /// 标签
    pub label: String,
}

/// REAPER工程
#[derive(Debug, Clone, PartialEq)]
pub struct ReaperProject {
    /// 轨道名
    pub track_name: String,
    /// 媒体项
    pub items: Vec<ProjectItem>,
    /// 标记
    pub markers: Vec<ProjectMarker>,
}

impl ReaperProject {
    /// 从书时间轴创建工程
    pub fn from_timeline(timeline: &BookTimeline) -> Self {
        let items = timeline
            .sections
            .iter()
            .map(|section| ProjectItem {
                name: section
                    .output_file_name
                    .strip_suffix(extension_of(&section.output_file_name).as_str())
                    .unwrap_or(&section.output_file_name)
                    .to_string(),
                file: section.output_file_name.clone(),
                position: section.start,
                length: section.duration,
            })
            .collect();

        let markers = timeline
            .segments()
            .enumerate()
            .map(|(position, segment)| ProjectMarker {
                index: position + 1,
                position: segment.start,
                label: segment.identifier.clone(),
            })
            .collect();

        Self {
            track_name: timeline.title.clone(),
            items,
            markers,
        }
    }

    /// 写出工程文件
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }
}

/// 工程文件名：`{书名}.RPP`
pub fn project_file_name(timeline: &BookTimeline) -> String {
    make_safe_filename(&format!("{}.RPP", timeline.title))
}

/// 在书目录中写出工程文件，返回文件路径
pub fn write_project_file(timeline: &BookTimeline, book_directory: &Path) -> Result<PathBuf> {
    let path = book_directory.join(project_file_name(timeline));
    ReaperProject::from_timeline(timeline).write(&path)?;
    Ok(path)
}

/// 根据扩展名选择REAPER的媒体源类型
fn source_kind(file: &str) -> &'static str {
    match extension_of(file).to_ascii_lowercase().as_str() {
        ".mp3" => "MP3",
        ".ogg" => "VORBIS",
        ".flac" => "FLAC",
        ".opus" => "OPUS",
        _ => "WAVE",
    }
}

/// RPP字符串引用：依次尝试双引号、单引号、反引号
fn quote(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('`') {
        format!("`{}`", value)
    } else {
        format!("\"{}\"", value.replace('"', "'"))
    }
}

impl Display for ReaperProject {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "<REAPER_PROJECT 0.1 \"6.0\" 0")?;
        writeln!(f, "  TIMEMODE 3")?;
        writeln!(f, "  TIMELOCKMODE 1")?;

        for marker in &self.markers {
            writeln!(
                f,
                "  MARKER {} {} {} 0",
                marker.index,
                format_seconds(marker.position),
                quote(&marker.label)
            )?;
        }

        writeln!(f, "  <TRACK")?;
        writeln!(f, "    NAME {}", quote(&self.track_name))?;
        for item in &self.items {
            writeln!(f, "    <ITEM")?;
            writeln!(f, "      POSITION {}", format_seconds(item.position))?;
            writeln!(f, "      LENGTH {}", format_seconds(item.length))?;
            writeln!(f, "      NAME {}", quote(&item.name))?;
            writeln!(f, "      <SOURCE {}", source_kind(&item.file))?;
            writeln!(f, "        FILE {}", quote(&item.file))?;
            writeln!(f, "      >")?;
            writeln!(f, "    >")?;
        }
        writeln!(f, "  >")?;
        writeln!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daisy::ncc::SectionLevel;
    use crate::daisy::smil::AudioSegment;
    use crate::daisy::timeline::SectionTimeline;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn section(title: &str, file: &str, start: &str, duration: &str, ids: &[&str]) -> SectionTimeline {
        SectionTimeline {
            level: SectionLevel::Chapter,
            title: title.to_string(),
            output_file_name: file.to_string(),
            source_file_name: "src.mp3".to_string(),
            start: dec(start),
            duration: dec(duration),
            segments: ids
                .iter()
                .enumerate()
                .map(|(i, id)| AudioSegment {
                    identifier: id.to_string(),
                    source_file_name: "src.mp3".to_string(),
                    start: dec(start) + Decimal::from(i),
                    end: dec(start) + Decimal::from(i + 1),
                })
                .collect(),
        }
    }

    fn timeline() -> BookTimeline {
        BookTimeline {
            index: 1,
            title: "My \"Book\"".to_string(),
            directory_name: "01 - My _Book_".to_string(),
            sections: vec![
                section("My Book", "00 - My _Book_.mp3", "0", "4.000", &["0 - 1"]),
                section("1", "1 - 0.wav", "4", "20.5", &["1 - 0 - 1", "1 - 0 - 2"]),
            ],
        }
    }

    #[test]
    fn test_project_from_timeline() {
        let project = ReaperProject::from_timeline(&timeline());
        assert_eq!(project.items.len(), 2);
        assert_eq!(project.items[1].name, "1 - 0");
        assert_eq!(project.items[1].position, dec("4"));
        assert_eq!(project.items[1].length, dec("20.5"));

        let labels: Vec<_> = project.markers.iter().map(|m| (m.index, m.label.as_str())).collect();
        assert_eq!(labels, vec![(1, "0 - 1"), (2, "1 - 0 - 1"), (3, "1 - 0 - 2")]);
        assert_eq!(project.markers[2].position, dec("5"));
    }

    #[test]
    fn test_render_project() {
        let rendered = ReaperProject::from_timeline(&timeline()).to_string();
        assert!(rendered.starts_with("<REAPER_PROJECT"));
        assert!(rendered.contains("  TIMEMODE 3\n  TIMELOCKMODE 1\n"));
        assert!(rendered.contains("  MARKER 2 4 \"1 - 0 - 1\" 0\n"));
        assert!(rendered.contains("    NAME 'My \"Book\"'\n"));
        assert!(rendered.contains("      <SOURCE MP3\n        FILE \"00 - My _Book_.mp3\"\n"));
        assert!(rendered.contains("      <SOURCE WAVE\n        FILE \"1 - 0.wav\"\n"));
        assert!(rendered.ends_with(">\n"));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a \"b\""), "'a \"b\"'");
        assert_eq!(quote("a \"b\" 'c'"), "`a \"b\" 'c'`");
    }

    #[test]
    fn test_project_file_name() {
        assert_eq!(project_file_name(&timeline()), "My _Book_.RPP");
    }
}
