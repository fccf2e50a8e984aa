//! 标记文档的内存表示
//!
//! SMIL和XHTML形式的NCC使用quick-xml解析；不是良构XML的NCC退回到scraper的HTML解析。
//! 两种解析结果都被整理成同一个节点数组，再通过 [`Markup`] 查询。

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use scraper::{ElementRef, Html};

use crate::daisy::error::{DaisyError, Result};
use crate::daisy::markup::{AttributeMatch, Element, Markup};

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// 解析后的标记文档
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    fn empty() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    fn push(&mut self, parent: usize, kind: NodeKind) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        index
    }

    /// 解析XML内容（SMIL、XHTML形式的NCC）
    ///
    /// # 参数
    /// * `xml_content` - 文档的XML内容
    ///
    /// # 返回值
    /// * `Result<Document>` - 解析后的文档
    pub fn parse_xml(xml_content: &str) -> Result<Document> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().expand_empty_elements = true;

        let mut document = Document::empty();
        let mut stack: Vec<usize> = vec![0];

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    let parent = *stack.last().unwrap_or(&0);
                    let kind = Self::element_kind(e)?;
                    let index = document.push(parent, kind);
                    stack.push(index);
                }
                Event::End(_) => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    if !text.is_empty() {
                        let parent = *stack.last().unwrap_or(&0);
                        document.push(parent, NodeKind::Text(text.into_owned()));
                    }
                }
                Event::CData(e) => {
                    let parent = *stack.last().unwrap_or(&0);
                    let text = String::from_utf8_lossy(&e).into_owned();
                    document.push(parent, NodeKind::Text(text));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(document)
    }

    /// 解析HTML内容（不是良构XML的NCC）
    pub fn parse_html(html_content: &str) -> Document {
        let html = Html::parse_document(html_content);
        let mut document = Document::empty();
        document.import_html_element(html.root_element(), 0);
        document
    }

    fn import_html_element(&mut self, element: ElementRef<'_>, parent: usize) {
        let value = element.value();
        let attributes = value
            .attrs()
            .map(|(key, val)| (key.to_ascii_lowercase(), val.to_string()))
            .collect();
        let index = self.push(
            parent,
            NodeKind::Element {
                name: value.name().to_ascii_lowercase(),
                attributes,
            },
        );

        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.import_html_element(child_element, index);
            } else if let Some(text) = child.value().as_text() {
                self.push(index, NodeKind::Text(text.to_string()));
            }
        }
    }

    /// 读取元素名和属性
    fn element_kind(e: &BytesStart) -> Result<NodeKind> {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
        let mut attributes = Vec::new();

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| DaisyError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_ascii_lowercase();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(NodeKind::Element { name, attributes })
    }

    fn element(&self, index: usize) -> Option<Element<'_>> {
        match &self.nodes[index].kind {
            NodeKind::Element { name, attributes } => Some(Element::new(index, name, attributes)),
            _ => None,
        }
    }

    /// 先序遍历 `start` 的后代（不含自身）
    fn descendants(&self, start: usize) -> Vec<usize> {
        let mut result = Vec::new();
        let mut pending: Vec<usize> = self.nodes[start].children.iter().rev().copied().collect();
        while let Some(index) = pending.pop() {
            result.push(index);
            pending.extend(self.nodes[index].children.iter().rev().copied());
        }
        result
    }

    fn collect_text(&self, index: usize, result: &mut String) {
        match &self.nodes[index].kind {
            NodeKind::Text(text) => result.push_str(text),
            _ => {
                for &child in &self.nodes[index].children {
                    self.collect_text(child, result);
                }
            }
        }
    }
}

impl Markup for Document {
    fn find_all(&self, tags: &[&str]) -> Vec<Element<'_>> {
        self.descendants(0)
            .into_iter()
            .filter_map(|index| self.element(index))
            .filter(|element| tags.iter().any(|tag| *tag == element.name()))
            .collect()
    }

    fn find_first(&self, tag: &str, attribute: &str, matcher: AttributeMatch<'_>) -> Option<Element<'_>> {
        self.descendants(0)
            .into_iter()
            .filter_map(|index| self.element(index))
            .find(|element| element.name() == tag && element.has_attribute(attribute, matcher))
    }

    fn next_sibling(&self, element: &Element<'_>, tags: &[&str]) -> Option<Element<'_>> {
        let parent = self.nodes[element.index].parent?;
        self.nodes[parent]
            .children
            .iter()
            .skip_while(|&&index| index != element.index)
            .skip(1)
            .filter_map(|&index| self.element(index))
            .find(|sibling| tags.iter().any(|tag| *tag == sibling.name()))
    }

    fn find_descendant(&self, element: &Element<'_>, tag: &str) -> Option<Element<'_>> {
        self.descendants(element.index)
            .into_iter()
            .filter_map(|index| self.element(index))
            .find(|descendant| descendant.name() == tag)
    }

    fn text(&self, element: &Element<'_>) -> String {
        let mut result = String::new();
        self.collect_text(element.index, &mut result);
        result
    }
}
