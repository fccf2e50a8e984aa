//! 转换驱动
//!
//! 在输入目录中查找NCC导航文档，逐本书组装时间轴、复制音频并写出标记表和工程文件。
//! 书的序号在所有NCC之间连续编号。

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::daisy::config::Settings;
use crate::daisy::copier::{FileCopier, PlannedCopies};
use crate::daisy::error::{DaisyError, Result};
use crate::daisy::ncc::{NavigationDocument, Section};
use crate::daisy::render;
use crate::daisy::timeline::TimelineAssembler;
use crate::daisy::timeline::naming;

/// 递归查找NCC导航文档，按文件名排序
///
/// # 参数
/// * `input` - 输入目录
/// * `settings` - 决定要查找的文件名以及是否忽略大小写
pub fn discover_navigation_files(input: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let wanted = settings.navigation_file_name.as_str();
    let mut found = Vec::new();

    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let matches = if settings.case_insensitive_discovery {
            name.eq_ignore_ascii_case(wanted)
        } else {
            name == wanted
        };
        if matches {
            debug!(path = %entry.path().display(), "找到NCC");
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

/// 成功处理的一本书
#[derive(Debug, Clone, PartialEq)]
pub struct BookReport {
    /// 全局书序号
    pub index: usize,
    /// 书名
    pub title: String,
    /// 书的输出目录
    pub directory: PathBuf,
    /// 复制（或计划复制）的音频文件数
    pub audio_files: usize,
    /// 标记数
    pub segments: usize,
    /// 写出的标记表和工程文件
    pub outputs: Vec<PathBuf>,
}

/// 处理失败的一本书（或无法读取的NCC）
#[derive(Debug, Clone, PartialEq)]
pub struct FailedBook {
    /// 书的目录名，NCC本身失败时为NCC路径
    pub name: String,
    /// 错误信息
    pub error: String,
}

/// 一次运行的结果汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// 找到的NCC数量
    pub navigation_files: usize,
    /// 成功处理的书
    pub processed: Vec<BookReport>,
    /// 失败的书
    pub failed: Vec<FailedBook>,
}

impl RunSummary {
    /// 是否所有书都处理成功
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 转换驱动
#[derive(Debug, Clone)]
pub struct Extractor {
    settings: Settings,
    dry_run: bool,
}

impl Extractor {
    /// 创建驱动
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            dry_run: false,
        }
    }

    /// 只规划不写入：不创建目录、不复制音频、不写出产物
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 当前配置
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 处理输入目录中的所有书
    ///
    /// # 参数
    /// * `input` - 输入目录，必须存在
    /// * `output` - 输出目录，不存在时会被创建
    ///
    /// # 返回值
    /// 默认在第一本失败的书处返回错误；`keep_going` 时把失败记录在汇总中并继续。
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        if !input.is_dir() {
            return Err(DaisyError::InputNotFound(input.to_path_buf()));
        }

        let navigation_files = discover_navigation_files(input, &self.settings)?;
        if navigation_files.is_empty() {
            warn!(
                input = %input.display(),
                name = %self.settings.navigation_file_name,
                "输入目录中没有找到NCC"
            );
        }

        let mut summary = RunSummary {
            navigation_files: navigation_files.len(),
            ..RunSummary::default()
        };
        let mut next_index = 1;

        for path in &navigation_files {
            let books = match self.load_books(path) {
                Ok(books) => books,
                Err(e) => {
                    self.record_failure(&mut summary, path.display().to_string(), e)?;
                    continue;
                }
            };

            let assembler = TimelineAssembler::new(
                base_directory(path),
                self.settings.fallback_encoding.clone(),
                self.settings.chapter_naming,
            );

            for book in &books {
                let index = next_index;
                next_index += 1;

                match self.process_book(&assembler, book, index, output) {
                    Ok(report) => summary.processed.push(report),
                    Err(e) => {
                        let name = naming::book_directory_name(index, &book.title);
                        self.record_failure(&mut summary, name, e)?;
                    }
                }
            }
        }

        info!(
            processed = summary.processed.len(),
            failed = summary.failed.len(),
            "全部处理完成"
        );
        Ok(summary)
    }

    fn load_books(&self, path: &Path) -> Result<Vec<Section>> {
        let navigation = NavigationDocument::open(path, &self.settings.fallback_encoding)?;
        let books = navigation.books()?;
        info!(path = %path.display(), books = books.len(), "NCC已解析");
        for book in &books {
            debug!("章节树:\n{}", book);
        }
        Ok(books)
    }

    fn record_failure(&self, summary: &mut RunSummary, name: String, e: DaisyError) -> Result<()> {
        if !self.settings.keep_going {
            return Err(e);
        }
        error!(book = %name, error = %e, "处理失败，继续处理下一本");
        summary.failed.push(FailedBook {
            name,
            error: e.to_string(),
        });
        Ok(())
    }

    fn process_book(
        &self,
        assembler: &TimelineAssembler,
        book: &Section,
        index: usize,
        output: &Path,
    ) -> Result<BookReport> {
        let directory = output.join(naming::book_directory_name(index, &book.title));
        info!(index, title = %book.title, directory = %directory.display(), "开始处理");

        let (timeline, outputs) = if self.dry_run {
            let mut plan = PlannedCopies::default();
            let timeline = assembler.assemble(book, index, &mut plan)?;
            for (source, file_name) in &plan.copies {
                info!(source = %source.display(), target = %file_name, "计划复制");
            }
            (timeline, Vec::new())
        } else {
            let mut copier = FileCopier::new(&directory)?;
            let timeline = assembler.assemble(book, index, &mut copier)?;
            let outputs = render::write_outputs(&timeline, copier.destination(), self.settings.output_format)?;
            (timeline, outputs)
        };

        Ok(BookReport {
            index,
            title: timeline.title.clone(),
            directory,
            audio_files: timeline.sections.len(),
            segments: timeline.segment_count(),
            outputs,
        })
    }
}

fn base_directory(navigation_file: &Path) -> PathBuf {
    navigation_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
