use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaisyError>;

/// DAISY处理相关的错误类型
#[derive(Error, Debug)]
pub enum DaisyError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("CSV写入错误: {0}")]
    CsvError(#[from] csv::Error),

    #[error("{} 不存在或不是目录", .0.display())]
    InputNotFound(PathBuf),

    #[error("文档格式错误 ({}): {detail}", document.display())]
    Format { document: PathBuf, detail: String },

    #[error("时间格式错误: {0}")]
    TimeFormat(String),

    #[error("音频源文件不一致 ({}): 期望 {expected}, 找到: {found}", document.display())]
    InconsistentSource {
        document: PathBuf,
        expected: String,
        found: String,
    },

    #[error("缺少元数据 ({}): {detail}", document.display())]
    MissingMetadata { document: PathBuf, detail: String },

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}

impl DaisyError {
    /// 构造带文档路径的格式错误
    pub fn format(document: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        DaisyError::Format {
            document: document.into(),
            detail: detail.into(),
        }
    }

    /// 构造带文档路径的缺少元数据错误
    pub fn missing_metadata(document: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        DaisyError::MissingMetadata {
            document: document.into(),
            detail: detail.into(),
        }
    }
}
