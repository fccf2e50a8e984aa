//! 书时间轴模块
//!
//! 把一本书中所有章节的音频片段投影到同一条时间轴上，并决定输出文件名。

pub mod assembler;
pub mod naming;

pub use assembler::{AudioSink, BookTimeline, SectionTimeline, TimelineAssembler};
pub use naming::ChapterNaming;
