//! 时间轴组装器
//!
//! 深度优先遍历一本书的章节树：每个章节读取自己的SMIL文档，
//! 以 `章节累计时长 − 书累计时长` 作为偏移提取音频片段，
//! 并为章节的首个音频文件生成新的文件名。

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::daisy::error::{DaisyError, Result};
use crate::daisy::ncc::{Section, SectionLevel};
use crate::daisy::sanitize::make_safe_filename;
use crate::daisy::smil::{AudioSegment, SyncDocument};
use crate::daisy::timeline::naming::{self, ChapterNaming};

/// 音频文件的复制目标
///
/// 组装器每发现一个章节就发出一次复制请求。
pub trait AudioSink {
    /// 将 `source` 复制为书目录中的 `file_name`
    fn copy_audio(&mut self, source: &Path, file_name: &str) -> Result<()>;
}

/// 一个章节在书时间轴上的位置
#[derive(Debug, Clone, PartialEq)]
pub struct SectionTimeline {
    /// 层级
    pub level: SectionLevel,
    /// 标题
    pub title: String,
    /// 复制后的音频文件名
    pub output_file_name: String,
    /// 原始音频文件名
    pub source_file_name: String,
    /// 章节开始位置（相对书开头）
    pub start: Decimal,
    /// 章节时长
    pub duration: Decimal,
    /// 章节内的音频片段
    pub segments: Vec<AudioSegment>,
}

/// 一本书的完整时间轴
#[derive(Debug, Clone, PartialEq)]
pub struct BookTimeline {
    /// 全局书序号（跨NCC连续编号）
    pub index: usize,
    /// 书名
    pub title: String,
    /// 输出目录名
    pub directory_name: String,
    /// 按遍历顺序排列的章节
    pub sections: Vec<SectionTimeline>,
}

impl BookTimeline {
    /// 按遍历顺序拼接的所有音频片段
    pub fn segments(&self) -> impl Iterator<Item = &AudioSegment> {
        self.sections.iter().flat_map(|section| section.segments.iter())
    }

    /// 片段总数
    pub fn segment_count(&self) -> usize {
        self.sections.iter().map(|section| section.segments.len()).sum()
    }

    /// 片段开始时间是否单调不减
    pub fn is_monotonic(&self) -> bool {
        let starts: Vec<Decimal> = self.segments().map(|segment| segment.start).collect();
        starts.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// 时间轴组装器
#[derive(Debug, Clone)]
pub struct TimelineAssembler {
    base_directory: PathBuf,
    fallback_encoding: String,
    chapter_naming: ChapterNaming,
}

impl TimelineAssembler {
    /// 创建组装器
    ///
    /// # 参数
    /// * `base_directory` - NCC所在目录，章节的SMIL路径相对于此目录
    /// * `fallback_encoding` - 非UTF-8文档使用的编码
    /// * `chapter_naming` - 章标签策略
    pub fn new(base_directory: impl Into<PathBuf>, fallback_encoding: impl Into<String>, chapter_naming: ChapterNaming) -> Self {
        Self {
            base_directory: base_directory.into(),
            fallback_encoding: fallback_encoding.into(),
            chapter_naming,
        }
    }

    /// 组装一本书的时间轴，同时通过 `sink` 复制各章节的音频文件
    pub fn assemble(&self, book: &Section, book_index: usize, sink: &mut impl AudioSink) -> Result<BookTimeline> {
        let book_document = self.open(book)?;
        let book_anchor = book_document.elapsed_anchor()?;

        let chapter_width = naming::digit_count(book.children.len());
        let book_label = naming::zero_pad("0", chapter_width);

        let mut sections = vec![self.section_timeline(
            book,
            &book_document,
            book_anchor,
            &format!("{} - ", book_label),
            &naming::book_stem(&book.title),
            sink,
        )?];

        for (chapter_index, chapter) in book.children.iter().enumerate() {
            let position = chapter_index + 1;
            let chapter_label = self.chapter_naming.label(&chapter.title, position, chapter_width);
            let subheading_width = naming::digit_count(chapter.children.len());

            let chapter_document = self.open(chapter)?;
            sections.push(self.section_timeline(
                chapter,
                &chapter_document,
                book_anchor,
                &format!("{} - {} - ", chapter_label, naming::zero_pad("0", subheading_width)),
                &naming::chapter_stem(&chapter_label, subheading_width),
                sink,
            )?);

            for (subheading_index, subheading) in chapter.children.iter().enumerate() {
                let subheading_label = naming::zero_pad(&(subheading_index + 1).to_string(), subheading_width);
                let subheading_document = self.open(subheading)?;
                sections.push(self.section_timeline(
                    subheading,
                    &subheading_document,
                    book_anchor,
                    &format!("{} - {} - ", chapter_label, subheading_label),
                    &naming::subheading_stem(&chapter_label, &subheading_label, &subheading.title),
                    sink,
                )?);
            }
        }

        let timeline = BookTimeline {
            index: book_index,
            title: book.title.clone(),
            directory_name: naming::book_directory_name(book_index, &book.title),
            sections,
        };

        if !timeline.is_monotonic() {
            warn!(book = %timeline.title, "音频片段的开始时间不是单调递增的，请检查SMIL中的累计时长");
        }
        info!(
            book = %timeline.title,
            sections = timeline.sections.len(),
            segments = timeline.segment_count(),
            "时间轴组装完成"
        );

        Ok(timeline)
    }

    fn open(&self, section: &Section) -> Result<SyncDocument> {
        SyncDocument::open(&self.base_directory.join(&section.source_file), &self.fallback_encoding)
    }

    fn section_timeline(
        &self,
        section: &Section,
        document: &SyncDocument,
        book_anchor: Decimal,
        id_prefix: &str,
        file_stem: &str,
        sink: &mut impl AudioSink,
    ) -> Result<SectionTimeline> {
        let start = document.elapsed_anchor()? - book_anchor;
        let segments = document.segments(start, id_prefix)?;

        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DaisyError::missing_metadata(document.path(), "章节不包含音频片段")),
        };

        let source_file_name = first.source_file_name.clone();
        let output_file_name = make_safe_filename(&format!("{}{}", file_stem, naming::extension_of(&source_file_name)));
        let duration = match document.duration()? {
            Some(duration) => duration,
            None => last.end - start,
        };

        let audio_directory = document.path().parent().unwrap_or(self.base_directory.as_path());
        sink.copy_audio(&audio_directory.join(&source_file_name), &output_file_name)?;

        debug!(
            title = %section.title,
            level = section.level.depth(),
            start = %start,
            file = %output_file_name,
            "章节已处理"
        );

        Ok(SectionTimeline {
            level: section.level,
            title: section.title.clone(),
            output_file_name,
            source_file_name,
            start,
            duration,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daisy::copier::PlannedCopies;
    use std::fs;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn smil(elapsed: &str, audio_file: &str, clips: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (index, (begin, end)) in clips.iter().enumerate() {
            body.push_str(&format!(
                "<par><audio src=\"{}\" clip-begin=\"npt={}s\" clip-end=\"npt={}s\" id=\"aud_{:04x}\"/></par>\n",
                audio_file,
                begin,
                end,
                index + 1
            ));
        }
        format!(
            "<?xml version=\"1.0\"?>\n<smil><head><meta name=\"ncc:totalElapsedTime\" content=\"{}\"/></head>\n<body><seq>\n{}</seq></body></smil>",
            elapsed, body
        )
    }

    fn section(level: SectionLevel, title: &str, file: &str) -> Section {
        Section::new(level, title.to_string(), file.to_string())
    }

    /// 一本书、两章，第一章有两个小节
    fn fixture() -> (TempDir, Section) {
        let dir = TempDir::new().unwrap();
        let files = [
            ("book.smil", smil("00:00:00", "a001.mp3", &[("0.000", "4.000")])),
            ("ch1.smil", smil("00:00:04", "a002.mp3", &[("0.000", "10.000"), ("10.000", "20.500")])),
            ("s1.smil", smil("00:00:24.5", "a003.mp3", &[("0.000", "5.000")])),
            ("s2.smil", smil("00:00:29.5", "a004.mp3", &[("0.000", "30.500")])),
            ("ch2.smil", smil("01:00", "a005.mp3", &[("0.000", "7.250")])),
        ];
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }

        let mut book = section(SectionLevel::Book, "My Book", "book.smil");
        let mut ch1 = section(SectionLevel::Chapter, "1", "ch1.smil");
        ch1.add_child(section(SectionLevel::Subheading, "Notes: First", "s1.smil"));
        ch1.add_child(section(SectionLevel::Subheading, "Second", "s2.smil"));
        book.add_child(ch1);
        book.add_child(section(SectionLevel::Chapter, "Epilogue", "ch2.smil"));
        (dir, book)
    }

    #[test]
    fn test_assemble_book() {
        let (dir, book) = fixture();
        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::NumericTitle);
        let mut sink = PlannedCopies::default();

        let timeline = assembler.assemble(&book, 4, &mut sink).unwrap();

        assert_eq!(timeline.directory_name, "04 - My Book");
        assert_eq!(timeline.sections.len(), 5);
        assert_eq!(timeline.segment_count(), 6);
        assert!(timeline.is_monotonic());

        let names: Vec<_> = sink.copies.iter().map(|(_, name)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["00 - My Book.mp3", "1 - 0.mp3", "1 - 1 - Notes - First.mp3", "1 - 2 - Second.mp3", "2 - 0.mp3"]
        );
        assert_eq!(sink.copies[0].0, dir.path().join("a001.mp3"));
    }

    #[test]
    fn test_offsets_relative_to_book_anchor() {
        let (dir, book) = fixture();
        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::NumericTitle);
        let timeline = assembler.assemble(&book, 1, &mut PlannedCopies::default()).unwrap();

        let starts: Vec<Decimal> = timeline.sections.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![dec("0"), dec("4"), dec("24.5"), dec("29.5"), dec("60")]);

        let chapter = &timeline.sections[1];
        assert_eq!(chapter.segments[1].start, dec("14.000"));
        assert_eq!(chapter.segments[1].identifier, "1 - 0 - 2");
        assert_eq!(chapter.duration, dec("20.500"));

        let last = timeline.segments().last().unwrap();
        assert_eq!(last.start, dec("60"));
        assert_eq!(last.end, dec("67.250"));
        assert_eq!(last.identifier, "2 - 0 - 1");
    }

    #[test]
    fn test_book_anchor_is_subtracted() {
        let (dir, book) = fixture();
        // 书本身不从0开始时，所有章节相对书开头计算
        fs::write(dir.path().join("book.smil"), smil("00:00:10", "a001.mp3", &[("0.000", "4.000")])).unwrap();
        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::NumericTitle);
        let timeline = assembler.assemble(&book, 1, &mut PlannedCopies::default()).unwrap();

        assert_eq!(timeline.sections[0].start, Decimal::ZERO);
        assert_eq!(timeline.sections[1].start, dec("-6"));
        assert!(!timeline.is_monotonic());
    }

    #[test]
    fn test_positional_naming_ignores_titles() {
        let (dir, mut book) = fixture();
        book.children[0].title = "7".to_string();
        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::Positional);
        let mut sink = PlannedCopies::default();
        assembler.assemble(&book, 1, &mut sink).unwrap();
        assert_eq!(sink.copies[1].1, "1 - 0.mp3");

        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::NumericTitle);
        let mut sink = PlannedCopies::default();
        assembler.assemble(&book, 1, &mut sink).unwrap();
        assert_eq!(sink.copies[1].1, "7 - 0.mp3");
    }

    /// 写出只有一个片段的SMIL，累计时长为 `elapsed` 秒
    fn write_single_clip(dir: &Path, name: &str, elapsed: usize) -> Section {
        let audio = format!("{}.mp3", name);
        fs::write(
            dir.join(format!("{}.smil", name)),
            smil(&elapsed.to_string(), &audio, &[("0.000", "1.000")]),
        )
        .unwrap();
        section(SectionLevel::Chapter, name, &format!("{}.smil", name))
    }

    #[test]
    fn test_padding_width_per_book_and_per_chapter() {
        let dir = TempDir::new().unwrap();
        let mut elapsed = 0;
        let mut next = |dir: &Path, name: &str, level: SectionLevel| {
            let mut section = write_single_clip(dir, name, elapsed);
            section.level = level;
            elapsed += 1;
            section
        };

        // 十章：第1章有十个小节，第2章只有一个小节
        let mut big = next(dir.path(), "Big", SectionLevel::Book);
        for chapter_index in 1..=10 {
            let mut chapter = next(dir.path(), &format!("c{}", chapter_index), SectionLevel::Chapter);
            let subheadings = match chapter_index {
                1 => 10,
                2 => 1,
                _ => 0,
            };
            for sub_index in 1..=subheadings {
                chapter.add_child(next(dir.path(), &format!("c{}s{}", chapter_index, sub_index), SectionLevel::Subheading));
            }
            big.add_child(chapter);
        }

        let mut small = next(dir.path(), "Small", SectionLevel::Book);
        small.add_child(next(dir.path(), "d1", SectionLevel::Chapter));
        small.add_child(next(dir.path(), "d2", SectionLevel::Chapter));

        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::Positional);

        let mut sink = PlannedCopies::default();
        let timeline = assembler.assemble(&big, 1, &mut sink).unwrap();
        let names: Vec<&str> = sink.copies.iter().map(|(_, name)| name.as_str()).collect();
        assert_eq!(names[0], "00 - Big.mp3");
        assert_eq!(names[1], "01 - 00.mp3");
        assert_eq!(names[2], "01 - 01 - c1s1.mp3");
        assert_eq!(names[11], "01 - 10 - c1s10.mp3");
        assert_eq!(names[12], "02 - 0.mp3");
        assert_eq!(names[13], "02 - 1 - c2s1.mp3");
        assert_eq!(names[14], "03 - 0.mp3");
        assert_eq!(names.last(), Some(&"10 - 0.mp3"));
        assert_eq!(timeline.sections[0].segments[0].identifier, "00 - 1");
        assert_eq!(timeline.sections[11].segments[0].identifier, "01 - 10 - 1");
        assert_eq!(timeline.sections[13].segments[0].identifier, "02 - 1 - 1");

        let mut sink = PlannedCopies::default();
        assembler.assemble(&small, 2, &mut sink).unwrap();
        let names: Vec<&str> = sink.copies.iter().map(|(_, name)| name.as_str()).collect();
        assert_eq!(names, vec!["00 - Small.mp3", "1 - 0.mp3", "2 - 0.mp3"]);
    }

    #[test]
    fn test_empty_section_is_missing_metadata() {
        let (dir, book) = fixture();
        fs::write(dir.path().join("s2.smil"), smil("00:00:29.5", "a004.mp3", &[])).unwrap();
        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::NumericTitle);
        let result = assembler.assemble(&book, 1, &mut PlannedCopies::default());
        assert!(matches!(result, Err(DaisyError::MissingMetadata { .. })));
    }

    #[test]
    fn test_missing_smil_is_io_error() {
        let (dir, book) = fixture();
        fs::remove_file(dir.path().join("ch2.smil")).unwrap();
        let assembler = TimelineAssembler::new(dir.path(), "windows-1252", ChapterNaming::NumericTitle);
        let result = assembler.assemble(&book, 1, &mut PlannedCopies::default());
        assert!(matches!(result, Err(DaisyError::Io(_))));
    }
}
