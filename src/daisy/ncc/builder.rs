//! 章节树构建器
//!
//! 按文档顺序单遍扫描标题，状态（当前书、当前章）保存在 [`SectionTreeBuilder`] 中。
//! 紧跟着另一个h1的h1（没有下级内容，例如封面）不会成为一本书；
//! 找不到上级的h2/h3会被丢弃而不是报错。

use std::path::Path;

use tracing::debug;

use crate::daisy::error::{DaisyError, Result};
use crate::daisy::markup::Markup;
use crate::daisy::ncc::section::{Section, SectionLevel};

/// 参与层级结构的标题标签
pub const HEADING_TAGS: [&str; 3] = ["h1", "h2", "h3"];

/// NCC中的一个标题条目
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// 层级
    pub level: SectionLevel,
    /// 标题文本
    pub title: String,
    /// SMIL文档路径（不含片段标识）
    pub source_file: String,
}

impl Heading {
    /// 创建标题条目，`href` 中的 `#片段` 会被去掉
    pub fn new(level: SectionLevel, title: impl Into<String>, href: &str) -> Self {
        let source_file = href.split('#').next().unwrap_or_default().to_string();
        Self {
            level,
            title: title.into(),
            source_file,
        }
    }
}

/// 章节树构建状态
#[derive(Debug, Default)]
pub struct SectionTreeBuilder {
    books: Vec<Section>,
    book_open: bool,
    chapter_open: bool,
}

impl SectionTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理一个标题
    ///
    /// # 参数
    /// * `heading` - 当前标题
    /// * `next_level` - 下一个标题的层级，没有下一个标题时为 `None`
    pub fn push(&mut self, heading: Heading, next_level: Option<SectionLevel>) {
        match heading.level {
            SectionLevel::Book => {
                if next_level.is_some_and(|level| level != SectionLevel::Book) {
                    self.books.push(Self::section(heading));
                    self.book_open = true;
                } else {
                    debug!(title = %heading.title, "忽略没有下级内容的h1");
                }
                self.chapter_open = false;
            }
            SectionLevel::Chapter => {
                match self.current_book() {
                    Some(book) => {
                        book.add_child(Self::section(heading));
                        self.chapter_open = true;
                    }
                    None => {
                        debug!(title = %heading.title, "忽略没有所属书的h2");
                        self.chapter_open = false;
                    }
                }
            }
            SectionLevel::Subheading => match self.current_chapter() {
                Some(chapter) => chapter.add_child(Self::section(heading)),
                None => debug!(title = %heading.title, "忽略没有所属章的h3"),
            },
        }
    }

    /// 结束构建，返回所有书
    pub fn finish(self) -> Vec<Section> {
        self.books
    }

    fn section(heading: Heading) -> Section {
        Section::new(heading.level, heading.title, heading.source_file)
    }

    fn current_book(&mut self) -> Option<&mut Section> {
        if self.book_open { self.books.last_mut() } else { None }
    }

    fn current_chapter(&mut self) -> Option<&mut Section> {
        if !self.chapter_open {
            return None;
        }
        self.current_book().and_then(|book| book.children.last_mut())
    }
}

/// 从标题列表构建章节树，h1的预读取列表中的下一个标题
pub fn build_sections(headings: &[Heading]) -> Vec<Section> {
    let mut builder = SectionTreeBuilder::new();
    for (index, heading) in headings.iter().enumerate() {
        let next_level = headings.get(index + 1).map(|next| next.level);
        builder.push(heading.clone(), next_level);
    }
    builder.finish()
}

/// 从NCC文档构建章节树，h1的预读取文档中的下一个兄弟标题
///
/// # 参数
/// * `document` - 已解析的NCC文档
/// * `document_path` - NCC文件路径，用于错误信息
pub fn build_from_markup(document: &impl Markup, document_path: &Path) -> Result<Vec<Section>> {
    let mut builder = SectionTreeBuilder::new();

    for element in document.find_all(&HEADING_TAGS) {
        let Some(level) = SectionLevel::from_tag(element.name()) else {
            continue;
        };

        let link = document.find_descendant(&element, "a").ok_or_else(|| {
            DaisyError::format(document_path, format!("{} 标题缺少链接", element.name()))
        })?;
        let href = link.attribute("href").ok_or_else(|| {
            DaisyError::format(document_path, format!("{} 标题的链接缺少href属性", element.name()))
        })?;
        let heading = Heading::new(level, document.text(&link).trim(), href);

        let next_level = match level {
            SectionLevel::Book => document
                .next_sibling(&element, &HEADING_TAGS)
                .and_then(|sibling| SectionLevel::from_tag(sibling.name())),
            _ => None,
        };

        builder.push(heading, next_level);
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daisy::markup::Document;

    fn h1(title: &str) -> Heading {
        Heading::new(SectionLevel::Book, title, &format!("{}.smil#id", title))
    }

    fn h2(title: &str) -> Heading {
        Heading::new(SectionLevel::Chapter, title, &format!("{}.smil", title))
    }

    fn h3(title: &str) -> Heading {
        Heading::new(SectionLevel::Subheading, title, &format!("{}.smil", title))
    }

    #[test]
    fn test_heading_strips_fragment() {
        let heading = Heading::new(SectionLevel::Book, "A", "dtb_0001.smil#rgn_cnt_0001");
        assert_eq!(heading.source_file, "dtb_0001.smil");
    }

    #[test]
    fn test_trailing_bare_h1_is_dropped() {
        let books = build_sections(&[h1("A"), h2("A.1"), h1("B")]);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "A");
        assert_eq!(books[0].source_file, "A.smil");
        assert_eq!(books[0].children.len(), 1);
        assert_eq!(books[0].children[0].title, "A.1");
    }

    #[test]
    fn test_h1_followed_by_h1_is_dropped() {
        let books = build_sections(&[h1("Cover"), h1("A"), h2("A.1"), h3("A.1.a"), h1("B"), h2("B.1")]);
        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(books[0].children[0].children[0].title, "A.1.a");
        assert_eq!(books[1].children[0].title, "B.1");
    }

    #[test]
    fn test_h1_followed_by_h3_opens_book() {
        let books = build_sections(&[h1("A"), h3("orphan"), h2("A.1")]);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].children.len(), 1);
        assert!(books[0].children[0].children.is_empty());
    }

    #[test]
    fn test_orphans_are_dropped() {
        let books = build_sections(&[h3("x"), h2("y"), h1("A"), h2("A.1")]);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].total_sections(), 2);
    }

    #[test]
    fn test_new_book_resets_chapter() {
        let books = build_sections(&[h1("A"), h2("A.1"), h1("B"), h3("B.x"), h2("B.1"), h3("B.1.a")]);
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].children[0].children.len(), 0);
        assert_eq!(books[1].children.len(), 1);
        assert_eq!(books[1].children[0].children[0].title, "B.1.a");
    }

    #[test]
    fn test_build_from_markup() {
        let ncc = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body>
<h1 class="title" id="cover"><a href="cover.smil#c">Cover</a></h1>
<h1 id="b1"><a href="book.smil#t1"> My Book </a></h1>
<span class="page-normal"><a href="p.smil#p1">1</a></span>
<h2 id="c1"><a href="ch1.smil#t2">1</a></h2>
<h3 id="s1"><a href="s1.smil#t3">First</a></h3>
<h4 id="x"><a href="deep.smil#t4">Too deep</a></h4>
<h3 id="s2"><a href="s2.smil#t5">Second</a></h3>
<h2 id="c2"><a href="ch2.smil#t6">2</a></h2>
</body>
</html>"#;
        let document = Document::parse_xml(ncc).unwrap();
        let books = build_from_markup(&document, Path::new("NCC.HTML")).unwrap();

        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.title, "My Book");
        assert_eq!(book.source_file, "book.smil");
        assert_eq!(book.children.len(), 2);
        let subheadings: Vec<_> = book.children[0].children.iter().map(|s| s.source_file.as_str()).collect();
        assert_eq!(subheadings, vec!["s1.smil", "s2.smil"]);
    }

    #[test]
    fn test_build_from_markup_requires_link() {
        let ncc = r#"<html><body><h1>No link</h1><h2><a href="a.smil">A</a></h2></body></html>"#;
        let document = Document::parse_xml(ncc).unwrap();
        let result = build_from_markup(&document, Path::new("NCC.HTML"));
        assert!(matches!(result, Err(DaisyError::Format { .. })));
    }
}
