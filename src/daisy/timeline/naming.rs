//! 输出文件命名规则
//!
//! 章序号按本书的章数补零，小节序号按本章的小节数补零，
//! 因此不同书、不同章的补零宽度可能不同。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::daisy::sanitize::make_safe_filename;

/// 章标签的生成策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterNaming {
    /// 始终使用章在书中的位置（从1开始）
    Positional,
    /// 标题是纯数字时使用标题，否则使用位置
    #[default]
    NumericTitle,
    /// 始终使用标题原文
    Title,
}

impl ChapterNaming {
    /// 生成补零后的章标签
    ///
    /// # 参数
    /// * `title` - 章标题
    /// * `position` - 章在书中的位置（从1开始）
    /// * `width` - 补零宽度
    pub fn label(self, title: &str, position: usize, width: usize) -> String {
        let raw = match self {
            ChapterNaming::Positional => position.to_string(),
            ChapterNaming::NumericTitle if is_numeric(title) => title.to_string(),
            ChapterNaming::NumericTitle => position.to_string(),
            ChapterNaming::Title => title.to_string(),
        };
        zero_pad(&raw, width)
    }
}

fn is_numeric(title: &str) -> bool {
    !title.is_empty() && title.chars().all(|c| c.is_ascii_digit())
}

/// 十进制位数，用作补零宽度
pub fn digit_count(count: usize) -> usize {
    count.to_string().len()
}

/// 在左侧补零到指定宽度，已经足够长的字符串保持不变
pub fn zero_pad(value: &str, width: usize) -> String {
    format!("{:0>width$}", value)
}

/// 带前导句点的扩展名，没有扩展名时为空字符串
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// 书的输出目录名：`{序号:02} - {标题}`
pub fn book_directory_name(book_index: usize, title: &str) -> String {
    make_safe_filename(&format!("{:02} - {}", book_index, title))
}

/// 书本身的音频文件名（不含扩展名）
pub fn book_stem(title: &str) -> String {
    format!("00 - {}", title)
}

/// 章正文的音频文件名（不含扩展名），小节位置为0
pub fn chapter_stem(chapter_label: &str, subheading_width: usize) -> String {
    format!("{} - {}", chapter_label, zero_pad("0", subheading_width))
}

/// 小节的音频文件名（不含扩展名）
pub fn subheading_stem(chapter_label: &str, subheading_label: &str, title: &str) -> String {
    format!("{} - {} - {}", chapter_label, subheading_label, title)
}
