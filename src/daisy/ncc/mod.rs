//! NCC（Navigation Control Center）导航文档模块
//!
//! 此模块读取DAISY 2.02的`ncc.html`导航文档，将其中扁平的h1/h2/h3标题列表
//! 还原为书 → 章 → 小节的三层章节树。

pub mod builder;
pub mod section;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::daisy::error::Result;
use crate::daisy::markup::{self, Document};

pub use builder::{HEADING_TAGS, Heading, SectionTreeBuilder, build_from_markup, build_sections};
pub use section::{Section, SectionLevel};

/// 已加载的NCC导航文档
#[derive(Debug, Clone)]
pub struct NavigationDocument {
    path: PathBuf,
    document: Document,
}

impl NavigationDocument {
    /// 从文件加载NCC文档
    ///
    /// 先按XML解析；不是良构XML时退回HTML解析。
    ///
    /// # 参数
    /// * `path` - NCC文件路径
    /// * `fallback_encoding` - 非UTF-8文件使用的编码
    pub fn open(path: &Path, fallback_encoding: &str) -> Result<Self> {
        let content = markup::read_text(path, fallback_encoding)?;
        Ok(Self::parse(path, &content))
    }

    /// 从已读取的内容创建NCC文档
    pub fn parse(path: &Path, content: &str) -> Self {
        let document = match Document::parse_xml(content) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "NCC不是良构XML，改用HTML解析");
                Document::parse_html(content)
            }
        };

        Self {
            path: path.to_path_buf(),
            document,
        }
    }

    /// NCC文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// NCC所在目录，SMIL和音频文件的路径相对于此目录
    pub fn base_directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// 构建章节树，返回此NCC中的所有书
    pub fn books(&self) -> Result<Vec<Section>> {
        build_from_markup(&self.document, &self.path)
    }
}
