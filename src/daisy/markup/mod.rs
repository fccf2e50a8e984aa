//! 标记文档查询模块
//!
//! NCC导航文档和SMIL同步文档只通过一组很小的查询能力被访问：
//! 按标签查找元素、按属性查找首个元素、按标签集合查找下一个兄弟元素。
//! 目录树构建和音频片段提取只依赖 [`Markup`] 特征，与具体的解析库无关。

pub mod decode;
pub mod document;

use std::fs;
use std::io;
use std::path::Path;

use crate::daisy::error::Result;

pub use decode::decode_text;
pub use document::Document;

/// 读取文档文件并解码为字符串
///
/// 文件在返回前已关闭；IO错误信息中带上文件路径。
pub fn read_text(path: &Path, fallback_encoding: &str) -> Result<String> {
    let bytes = fs::read(path)
        .map_err(|e| io::Error::new(e.kind(), format!("无法读取 {}: {}", path.display(), e)))?;
    decode_text(&bytes, fallback_encoding)
}

/// 属性匹配条件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeMatch<'v> {
    /// 只要求属性存在
    Present,
    /// 要求属性值完全相等
    Equals(&'v str),
}

impl AttributeMatch<'_> {
    fn matches(&self, value: &str) -> bool {
        match self {
            AttributeMatch::Present => true,
            AttributeMatch::Equals(expected) => value == *expected,
        }
    }
}

/// 文档中某个元素的只读视图
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    pub(crate) index: usize,
    name: &'a str,
    attributes: &'a [(String, String)],
}

impl<'a> Element<'a> {
    pub(crate) fn new(index: usize, name: &'a str, attributes: &'a [(String, String)]) -> Self {
        Self {
            index,
            name,
            attributes,
        }
    }

    /// 元素标签名（小写）
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// 按名称获取属性值
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 检查属性是否满足匹配条件
    pub fn has_attribute(&self, name: &str, matcher: AttributeMatch<'_>) -> bool {
        self.attribute(name).is_some_and(|value| matcher.matches(value))
    }
}

/// 导航/同步文档的最小查询接口
pub trait Markup {
    /// 按文档顺序返回标签名属于 `tags` 的所有元素
    fn find_all(&self, tags: &[&str]) -> Vec<Element<'_>>;

    /// 返回第一个标签为 `tag` 且属性 `attribute` 满足条件的元素
    fn find_first(&self, tag: &str, attribute: &str, matcher: AttributeMatch<'_>) -> Option<Element<'_>>;

    /// 返回 `element` 之后第一个标签名属于 `tags` 的兄弟元素
    fn next_sibling(&self, element: &Element<'_>, tags: &[&str]) -> Option<Element<'_>>;

    /// 返回 `element` 内第一个标签为 `tag` 的后代元素
    fn find_descendant(&self, element: &Element<'_>, tag: &str) -> Option<Element<'_>>;

    /// 元素内全部文本内容
    fn text(&self, element: &Element<'_>) -> String;
}
