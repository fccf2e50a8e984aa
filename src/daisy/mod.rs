pub mod error;
pub mod timecode;
pub mod sanitize;
pub mod markup;
pub mod ncc;
pub mod smil;
pub mod timeline;
pub mod copier;
pub mod render;
pub mod config;
pub mod extractor;

// 重新导出错误处理
pub use error::{DaisyError, Result};

// 重新导出时间和文件名工具
pub use timecode::{format_seconds, parse_clip_timestamp, parse_duration, parse_elapsed};
pub use sanitize::make_safe_filename;

// 重新导出文档访问
pub use markup::{AttributeMatch, Document, Element, Markup};

// 重新导出NCC相关
pub use ncc::{
    NavigationDocument,
    Section,
    SectionLevel,
    Heading,
    SectionTreeBuilder,
    build_sections
};

// 重新导出SMIL相关
pub use smil::{AudioSegment, SyncDocument, extract_segments};

// 重新导出时间轴相关
pub use timeline::{AudioSink, BookTimeline, SectionTimeline, TimelineAssembler, ChapterNaming};
pub use copier::{FileCopier, PlannedCopies};

// 重新导出输出相关
pub use render::{ReaperProject, write_markers, write_markers_file, write_project_file, write_outputs};

// 重新导出配置和驱动
pub use config::{OutputFormat, Settings};
pub use extractor::{BookReport, Extractor, FailedBook, RunSummary, discover_navigation_files};
