//! SMIL同步文档模块
//!
//! 每个章节对应一个SMIL文档，其中的`audio`元素描述音频文件中的剪辑区间。
//! 此模块读取累计时长元数据，并把剪辑区间平移到整本书的全局时间轴上。

pub mod segment;

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::daisy::error::{DaisyError, Result};
use crate::daisy::markup::{self, AttributeMatch, Document, Markup};
use crate::daisy::timecode;

pub use segment::AudioSegment;

/// 累计时长元数据名称
pub const TOTAL_ELAPSED_TIME: &str = "ncc:totalElapsedTime";

/// 已加载的SMIL同步文档
#[derive(Debug, Clone)]
pub struct SyncDocument {
    path: PathBuf,
    document: Document,
}

impl SyncDocument {
    /// 从文件加载SMIL文档
    pub fn open(path: &Path, fallback_encoding: &str) -> Result<Self> {
        let content = markup::read_text(path, fallback_encoding)?;
        Self::parse(path, &content)
    }

    /// 从已读取的内容解析SMIL文档
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let document = Document::parse_xml(content)
            .map_err(|e| DaisyError::format(path, format!("SMIL解析失败: {}", e)))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// SMIL文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取 `ncc:totalElapsedTime`：本文档之前全部内容的累计时长
    pub fn elapsed_anchor(&self) -> Result<Decimal> {
        let meta = self
            .document
            .find_first("meta", "name", AttributeMatch::Equals(TOTAL_ELAPSED_TIME))
            .ok_or_else(|| DaisyError::missing_metadata(&self.path, format!("缺少 {} 元数据", TOTAL_ELAPSED_TIME)))?;
        let content = meta
            .attribute("content")
            .ok_or_else(|| DaisyError::missing_metadata(&self.path, format!("{} 元数据缺少content属性", TOTAL_ELAPSED_TIME)))?;

        timecode::parse_elapsed(content).map_err(|e| DaisyError::format(&self.path, e.to_string()))
    }

    /// 读取带 `dur` 属性的 `seq` 元素给出的时长
    pub fn duration(&self) -> Result<Option<Decimal>> {
        match self.document.find_first("seq", "dur", AttributeMatch::Present) {
            Some(seq) => {
                let dur = seq.attribute("dur").unwrap_or_default();
                timecode::parse_duration(dur)
                    .map(Some)
                    .map_err(|e| DaisyError::format(&self.path, e.to_string()))
            }
            None => Ok(None),
        }
    }

    /// 提取音频片段
    ///
    /// # 参数
    /// * `time_offset` - 加到每个剪辑时间上的偏移（本章节相对书开头的位置）
    /// * `id_prefix` - 片段标识前缀
    pub fn segments(&self, time_offset: Decimal, id_prefix: &str) -> Result<Vec<AudioSegment>> {
        extract_segments(&self.document, &self.path, time_offset, id_prefix)
    }
}

/// 从SMIL文档中提取全部音频片段
///
/// 片段按文档顺序返回；所有片段必须引用同一个音频文件。
pub fn extract_segments(
    document: &impl Markup,
    document_path: &Path,
    time_offset: Decimal,
    id_prefix: &str,
) -> Result<Vec<AudioSegment>> {
    let mut segments = Vec::new();

    for audio in document.find_all(&["audio"]) {
        let attribute = |name: &str| {
            audio
                .attribute(name)
                .ok_or_else(|| DaisyError::format(document_path, format!("audio元素缺少 {} 属性", name)))
        };
        let clip = |name: &str| -> Result<Decimal> {
            let value = timecode::parse_clip_timestamp(attribute(name)?)
                .map_err(|e| DaisyError::format(document_path, e.to_string()))?;
            value.checked_add(time_offset).ok_or_else(|| {
                DaisyError::format(document_path, format!("{} 加上偏移 {} 后溢出", name, time_offset))
            })
        };

        let source_file_name = attribute("src")?.to_string();
        let start = clip("clip-begin")?;
        let end = clip("clip-end")?;
        let id = attribute("id")?;
        let number = parse_id_number(id)
            .ok_or_else(|| DaisyError::format(document_path, format!("无法解析audio元素id: {}", id)))?;

        if end <= start {
            return Err(DaisyError::format(
                document_path,
                format!("audio片段结束时间 {} 不晚于开始时间 {}", end, start),
            ));
        }

        segments.push(AudioSegment {
            identifier: format!("{}{}", id_prefix, number),
            source_file_name,
            start,
            end,
        });
    }

    if let Some(first) = segments.first() {
        if let Some(other) = segments.iter().find(|s| s.source_file_name != first.source_file_name) {
            return Err(DaisyError::InconsistentSource {
                document: document_path.to_path_buf(),
                expected: first.source_file_name.clone(),
                found: other.source_file_name.clone(),
            });
        }
    }

    Ok(segments)
}

/// 取 `id` 最后一个 `_` 之后的部分，按十六进制解析
fn parse_id_number(id: &str) -> Option<u64> {
    let suffix = id.rsplit('_').next()?;
    u64::from_str_radix(suffix, 16).ok()
}
