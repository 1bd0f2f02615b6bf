//! Minimal markup tree for the headless surface.
//!
//! Parsing is deliberately forgiving: end tags that close nothing are ignored,
//! unclosed elements are closed at end of input, and HTML void elements
//! (`<br>`, `<img>`, ...) never open a scope.

use core::fmt;

use flow_pager::SourceDocument;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const HEAD_ONLY_TAGS: &[&str] = &["head", "title", "meta", "link", "style", "script", "base"];

/// Markup parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadlessError {
    /// The tokenizer rejected the input.
    Markup {
        /// Byte offset where tokenizing stopped.
        offset: u64,
        /// Tokenizer message.
        message: String,
    },
}

impl fmt::Display for HeadlessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup { offset, message } => {
                write!(f, "markup parse error at byte {}: {}", offset, message)
            }
        }
    }
}

impl std::error::Error for HeadlessError {}

/// An element with its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Lowercased local tag name.
    pub tag: String,
    /// `id` attribute.
    pub id: Option<String>,
    /// `href` attribute.
    pub href: Option<String>,
    /// Child nodes in document order.
    pub children: Vec<MarkupNode>,
}

/// A node in the markup tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupNode {
    /// Element node.
    Element(Element),
    /// Character data.
    Text(String),
}

impl MarkupNode {
    /// Element node without attributes.
    pub fn element(tag: impl Into<String>, children: Vec<MarkupNode>) -> Self {
        Self::Element(Element {
            tag: tag.into(),
            id: None,
            href: None,
            children,
        })
    }

    /// Element node with an `id`.
    pub fn element_with_id(
        tag: impl Into<String>,
        id: impl Into<String>,
        children: Vec<MarkupNode>,
    ) -> Self {
        Self::Element(Element {
            tag: tag.into(),
            id: Some(id.into()),
            href: None,
            children,
        })
    }

    /// Text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Whether this node or a descendant has `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        match self {
            Self::Element(element) => {
                element.id.as_deref() == Some(id)
                    || element.children.iter().any(|child| child.contains_id(id))
            }
            Self::Text(_) => false,
        }
    }

    /// Whether this is a text node holding only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Number of visible characters in this subtree, with whitespace runs
    /// counted once.
    pub fn visible_chars(&self) -> usize {
        let mut count = 0usize;
        let mut in_space = true;
        self.count_chars(&mut count, &mut in_space);
        count
    }

    fn count_chars(&self, count: &mut usize, in_space: &mut bool) {
        match self {
            Self::Text(text) => {
                for ch in text.chars() {
                    if ch.is_whitespace() {
                        if !*in_space {
                            *count += 1;
                            *in_space = true;
                        }
                    } else {
                        *count += 1;
                        *in_space = false;
                    }
                }
            }
            Self::Element(element) => {
                for child in &element.children {
                    child.count_chars(count, in_space);
                }
            }
        }
    }

    fn find_first(&self, tag: &str) -> Option<&Element> {
        let element = self.as_element()?;
        if element.tag == tag {
            return Some(element);
        }
        element.children.iter().find_map(|child| child.find_first(tag))
    }
}

fn find_first<'a>(nodes: &'a [MarkupNode], tag: &str) -> Option<&'a Element> {
    nodes.iter().find_map(|node| node.find_first(tag))
}

/// A parsed document: its base reference and body content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkupDocument {
    /// `href` of the first `<base>` element.
    pub base_href: Option<String>,
    /// Whether the document has a head section.
    pub has_head: bool,
    /// Body children in document order.
    pub body: Vec<MarkupNode>,
}

impl MarkupDocument {
    /// Document with the given body and no head.
    pub fn from_body(body: Vec<MarkupNode>) -> Self {
        Self {
            base_href: None,
            has_head: false,
            body,
        }
    }

    /// Number of elements anywhere in the body.
    pub fn element_count(&self) -> usize {
        fn count(nodes: &[MarkupNode]) -> usize {
            nodes
                .iter()
                .filter_map(MarkupNode::as_element)
                .map(|element| 1 + count(&element.children))
                .sum()
        }
        count(&self.body)
    }
}

impl SourceDocument for MarkupDocument {
    fn base_href(&self) -> Option<&str> {
        self.base_href.as_deref()
    }
}

/// Parse a full document or a body fragment.
///
/// The body is the `<body>` element's children when there is one, otherwise
/// the `<html>` element's non-head children, otherwise all non-head top-level
/// nodes.
pub fn parse_document(markup: &str) -> Result<MarkupDocument, HeadlessError> {
    let roots = parse_fragment(markup)?;
    let base_href = find_first(&roots, "base").and_then(|base| base.href.clone());
    let has_head = find_first(&roots, "head").is_some();

    let body = if let Some(body) = find_first(&roots, "body") {
        body.children.clone()
    } else if let Some(html) = find_first(&roots, "html") {
        without_head_nodes(&html.children)
    } else {
        without_head_nodes(&roots)
    };

    Ok(MarkupDocument {
        base_href,
        has_head,
        body,
    })
}

fn without_head_nodes(nodes: &[MarkupNode]) -> Vec<MarkupNode> {
    nodes
        .iter()
        .filter(|node| {
            node.as_element()
                .is_none_or(|element| !HEAD_ONLY_TAGS.contains(&element.tag.as_str()))
        })
        .cloned()
        .collect()
}

struct OpenElement {
    tag: String,
    id: Option<String>,
    href: Option<String>,
    children: Vec<MarkupNode>,
}

impl OpenElement {
    fn close(self) -> MarkupNode {
        MarkupNode::Element(Element {
            tag: self.tag,
            id: self.id,
            href: self.href,
            children: self.children,
        })
    }
}

/// Parse markup into its top-level nodes.
pub fn parse_fragment(markup: &str) -> Result<Vec<MarkupNode>, HeadlessError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;

    let mut roots: Vec<MarkupNode> = Vec::with_capacity(8);
    let mut stack: Vec<OpenElement> = Vec::with_capacity(8);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let open = open_element(&reader, &e)?;
                if VOID_TAGS.contains(&open.tag.as_str()) {
                    push_node(&mut stack, &mut roots, open.close());
                } else {
                    stack.push(open);
                }
            }
            Ok(Event::Empty(e)) => {
                let open = open_element(&reader, &e)?;
                push_node(&mut stack, &mut roots, open.close());
            }
            Ok(Event::End(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                if stack.iter().any(|open| open.tag == tag) {
                    while let Some(open) = stack.pop() {
                        let matched = open.tag == tag;
                        push_node(&mut stack, &mut roots, open.close());
                        if matched {
                            break;
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|err| markup_error(&reader, format!("decode error: {:?}", err)))?;
                push_text(&mut stack, &mut roots, text.as_ref());
            }
            Ok(Event::CData(e)) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| markup_error(&reader, format!("decode error: {:?}", err)))?;
                push_text(&mut stack, &mut roots, text.as_ref());
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e
                    .decode()
                    .map_err(|err| markup_error(&reader, format!("decode error: {:?}", err)))?;
                let entity = format!("&{};", name);
                // Entities outside the XML set still occupy a character cell.
                let resolved = quick_xml::escape::unescape(&entity)
                    .map(|text| text.into_owned())
                    .unwrap_or_else(|_| " ".to_string());
                push_text(&mut stack, &mut roots, &resolved);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(markup_error(&reader, format!("{:?}", err))),
            _ => {}
        }
    }

    while let Some(open) = stack.pop() {
        push_node(&mut stack, &mut roots, open.close());
    }
    Ok(roots)
}

fn markup_error(reader: &Reader<&[u8]>, message: String) -> HeadlessError {
    HeadlessError::Markup {
        offset: reader.buffer_position(),
        message,
    }
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String, HeadlessError> {
    let decoded = reader
        .decoder()
        .decode(raw)
        .map_err(|err| markup_error(reader, format!("tag decode error: {:?}", err)))?;
    let local_name = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Ok(local_name.to_ascii_lowercase())
}

fn open_element(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<OpenElement, HeadlessError> {
    let tag = decode_tag_name(reader, e.name().as_ref())?;
    let mut id = None;
    let mut href = None;
    for attr in e.attributes().flatten() {
        let key = attr.key.as_ref();
        let value = || {
            reader
                .decoder()
                .decode(attr.value.as_ref())
                .unwrap_or_default()
                .into_owned()
        };
        if key == b"id" || key == b"xml:id" {
            id = Some(value());
        } else if key == b"href" {
            href = Some(value());
        }
    }
    Ok(OpenElement {
        tag,
        id,
        href,
        children: Vec::new(),
    })
}

fn push_node(stack: &mut [OpenElement], roots: &mut Vec<MarkupNode>, node: MarkupNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn push_text(stack: &mut [OpenElement], roots: &mut Vec<MarkupNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    if let Some(MarkupNode::Text(existing)) = siblings.last_mut() {
        existing.push_str(text);
        return;
    }
    siblings.push(MarkupNode::Text(text.to_string()));
}
