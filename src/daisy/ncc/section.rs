//! 章节树数据结构定义
//!
//! NCC导航文档被还原为固定三层的树：书（h1）→ 章（h2）→ 小节（h3）。

use std::fmt::{Display, Formatter, Result as FmtResult};

/// 章节层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionLevel {
    /// 书（h1）
    Book = 1,
    /// 章（h2）
    Chapter = 2,
    /// 小节（h3）
    Subheading = 3,
}

impl SectionLevel {
    /// 根据标题标签名获取层级，`h4`及更深的标题不参与层级结构
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(SectionLevel::Book),
            "h2" => Some(SectionLevel::Chapter),
            "h3" => Some(SectionLevel::Subheading),
            _ => None,
        }
    }

    /// 数字层级（1-3）
    pub fn depth(self) -> u8 {
        self as u8
    }
}

/// 章节树节点
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// 层级
    pub level: SectionLevel,
    /// 标题
    pub title: String,
    /// SMIL同步文档的相对路径（已去掉片段标识）
    pub source_file: String,
    /// 子节点
    pub children: Vec<Section>,
}

impl Section {
    /// 创建新的章节节点
    pub fn new(level: SectionLevel, title: String, source_file: String) -> Self {
        Self {
            level,
            title,
            source_file,
            children: Vec::new(),
        }
    }

    /// 添加子节点
    pub fn add_child(&mut self, child: Section) {
        self.children.push(child);
    }

    /// 获取节点及其所有子节点的数量
    pub fn total_sections(&self) -> usize {
        1 + self.children.iter().map(Section::total_sections).sum::<usize>()
    }

    fn render_tree(&self, prefix: &str, is_last: bool, result: &mut String) {
        let branch = if is_last { "└── " } else { "├── " };
        result.push_str(&format!("{}{}{} → {}\n", prefix, branch, self.title, self.source_file));

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        for (index, child) in self.children.iter().enumerate() {
            child.render_tree(&child_prefix, index == self.children.len() - 1, result);
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut result = format!("📖 {} → {}\n", self.title, self.source_file);
        for (index, child) in self.children.iter().enumerate() {
            child.render_tree("", index == self.children.len() - 1, &mut result);
        }
        write!(f, "{}", result)
    }
}
