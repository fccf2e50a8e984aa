//! 运行配置模块
//!
//! 提供转换行为的配置管理功能，支持从YAML文件加载配置；命令行参数可覆盖文件中的值。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::daisy::error::{DaisyError, Result};
use crate::daisy::timeline::ChapterNaming;

/// 默认的NCC文件名
pub const DEFAULT_NAVIGATION_FILE_NAME: &str = "NCC.HTML";

/// 默认的后备编码
pub const DEFAULT_FALLBACK_ENCODING: &str = "windows-1252";

/// 输出产物
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// 只输出CSV标记表
    Markers,
    /// 只输出REAPER工程文件
    Project,
    /// 两者都输出
    #[default]
    Both,
}

impl OutputFormat {
    pub fn writes_markers(self) -> bool {
        matches!(self, OutputFormat::Markers | OutputFormat::Both)
    }

    pub fn writes_project(self) -> bool {
        matches!(self, OutputFormat::Project | OutputFormat::Both)
    }
}

/// 转换配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 输出产物
    pub output_format: OutputFormat,
    /// 章标签策略
    pub chapter_naming: ChapterNaming,
    /// 要查找的NCC文件名
    pub navigation_file_name: String,
    /// 查找NCC文件时是否忽略大小写
    pub case_insensitive_discovery: bool,
    /// 非UTF-8文档使用的编码
    pub fallback_encoding: String,
    /// 某本书失败后是否继续处理其余的书
    pub keep_going: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            chapter_naming: ChapterNaming::default(),
            navigation_file_name: DEFAULT_NAVIGATION_FILE_NAME.to_string(),
            case_insensitive_discovery: false,
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
            keep_going: false,
        }
    }
}

impl Settings {
    /// 从YAML配置文件加载，未出现的字段使用默认值
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DaisyError::ConfigError(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// 从YAML文本解析配置
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yml::from_str(content)
            .map_err(|e| DaisyError::ConfigError(format!("配置文件格式错误: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 生成带注释的默认配置文件内容
    pub fn default_yaml() -> Result<String> {
        let yaml_content = serde_yml::to_string(&Self::default())
            .map_err(|e| DaisyError::ConfigError(format!("序列化配置失败: {}", e)))?;

        Ok(format!(
            "# daisyforge 配置文件\n\
             # output_format: markers | project | both\n\
             # chapter_naming: positional | numeric-title | title\n\n{}",
            yaml_content
        ))
    }

    /// 检查配置中的取值是否可用
    pub fn validate(&self) -> Result<()> {
        if self.navigation_file_name.trim().is_empty() {
            return Err(DaisyError::ConfigError("navigation_file_name 不能为空".to_string()));
        }
        if encoding_rs::Encoding::for_label(self.fallback_encoding.as_bytes()).is_none() {
            return Err(DaisyError::ConfigError(format!("未知的编码: {}", self.fallback_encoding)));
        }
        Ok(())
    }
}
