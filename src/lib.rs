pub mod daisy;

// === 核心API重新导出 ===

/// 转换驱动（主要接口）
pub use daisy::{Extractor, RunSummary, BookReport, FailedBook};

/// 错误处理
pub use daisy::{DaisyError, Result};

/// 配置
pub use daisy::{Settings, OutputFormat, ChapterNaming};

// === 数据结构 ===

/// 章节树
pub use daisy::{Section, SectionLevel, NavigationDocument};

/// 音频片段和时间轴
pub use daisy::{AudioSegment, BookTimeline, SectionTimeline};

// === 底层组件（高级用法） ===

/// 时间格式解析
pub use daisy::{parse_elapsed, parse_clip_timestamp, parse_duration, format_seconds};

/// 文件名清理
pub use daisy::make_safe_filename;

/// 组装和输出
pub use daisy::{
    SyncDocument,
    TimelineAssembler,
    AudioSink,
    FileCopier,
    PlannedCopies,
    ReaperProject,
    write_markers,
    write_outputs,
};

// === 库信息 ===

/// daisyforge库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// daisyforge库的描述
pub const DESCRIPTION: &str = "把DAISY 2.02有声书转换为重命名的音频文件、REAPER标记表和工程文件";

/// 库的主页
pub const HOMEPAGE: &str = "https://github.com/FWW321/daisyforge";

// === 便捷函数 ===

/// 使用默认配置转换输入目录中的所有书
///
/// 这是 `Extractor::new(Settings::default()).run(..)` 的便捷包装函数。
///
/// # 参数
/// * `input` - 包含NCC.HTML的输入目录
/// * `output` - 输出目录
///
/// # 返回值
/// * `Result<RunSummary>` - 处理结果汇总
///
/// # 示例
///
/// ```no_run
/// let summary = daisyforge::convert("daisy_book", "out")?;
/// println!("已处理: {} 本", summary.processed.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn convert<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(input: P, output: Q) -> Result<RunSummary> {
    Extractor::new(Settings::default()).run(input.as_ref(), output.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        println!("daisyforge version: {}", VERSION);
    }

    #[test]
    fn test_description() {
        assert!(!DESCRIPTION.is_empty());
    }

    #[test]
    fn test_convert_missing_input() {
        let result = convert("/nonexistent/daisy_book", "/tmp/daisyforge-out");
        assert!(matches!(result, Err(DaisyError::InputNotFound(_))));
    }
}
