//! Deterministic column flow.
//!
//! Text is set in a fixed-advance font: every visible character is
//! `font_size_px * char_advance_em` wide and every line is
//! `font_size_px * line_height` tall. Block elements start on a new line and
//! are separated by `block_gap_lines` empty lines. Lines fill a column top to
//! bottom, then continue in the next column.

use serde::Serialize;

use crate::dom::{Element, MarkupNode};

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "nav", "ol", "p", "pre",
    "section", "table", "tr", "ul",
];

const HIDDEN_TAGS: &[&str] = &["script", "style", "template", "head", "title"];

/// Text metrics used by the headless flow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeadlessMetrics {
    /// Body font size.
    pub font_size_px: f32,
    /// Advance width of one character, in ems.
    pub char_advance_em: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Empty lines between consecutive blocks.
    pub block_gap_lines: u32,
}

impl Default for HeadlessMetrics {
    fn default() -> Self {
        Self {
            font_size_px: 16.0,
            char_advance_em: 0.5,
            line_height: 1.5,
            block_gap_lines: 1,
        }
    }
}

impl HeadlessMetrics {
    /// Height of one line, never below one unit.
    pub fn line_px(&self) -> u32 {
        (self.font_size_px * self.line_height).round().max(1.0) as u32
    }

    /// Characters that fit on one line of `width`, never below one.
    pub fn chars_per_line(&self, width: u32) -> u32 {
        let advance = self.font_size_px * self.char_advance_em;
        if !advance.is_finite() || advance <= 0.0 {
            return width.max(1);
        }
        ((width as f32 / advance).floor() as u32).max(1)
    }
}

/// Where one body-level node landed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockPlacement {
    /// Index among the body's children.
    pub node_index: usize,
    /// First line occupied.
    pub start_line: u32,
    /// Lines occupied.
    pub line_count: u32,
    /// Whether the node is an element (as opposed to loose text).
    pub is_element: bool,
}

impl BlockPlacement {
    /// One past the last line occupied.
    pub fn end_line(&self) -> u32 {
        self.start_line + self.line_count
    }
}

/// Result of flowing a body into columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnFlow {
    /// Column width used for line breaking.
    pub column_width: u32,
    /// Height of one line.
    pub line_px: u32,
    /// Lines that fit in one column.
    pub lines_per_column: u32,
    /// Lines used by the whole body.
    pub total_lines: u32,
    /// Placement of every rendered body-level node.
    pub blocks: Vec<BlockPlacement>,
}

impl ColumnFlow {
    /// Flow `body` into columns `column_width` wide and `height` tall.
    pub fn compute(
        body: &[MarkupNode],
        column_width: u32,
        height: u32,
        metrics: &HeadlessMetrics,
    ) -> Self {
        let line_px = metrics.line_px();
        let chars_per_line = metrics.chars_per_line(column_width);
        let lines_per_column = (height / line_px).max(1);

        let mut blocks = Vec::with_capacity(body.len());
        let mut cursor = 0u32;
        for (node_index, node) in body.iter().enumerate() {
            if node.is_blank_text() {
                continue;
            }
            let line_count = node_lines(node, chars_per_line, metrics.block_gap_lines);
            if line_count > 0 && cursor > 0 {
                cursor = cursor.saturating_add(metrics.block_gap_lines);
            }
            blocks.push(BlockPlacement {
                node_index,
                start_line: cursor,
                line_count,
                is_element: node.as_element().is_some(),
            });
            cursor = cursor.saturating_add(line_count);
        }

        Self {
            column_width,
            line_px,
            lines_per_column,
            total_lines: cursor,
            blocks,
        }
    }

    /// Columns needed, never below one.
    pub fn column_count(&self) -> u32 {
        self.total_lines.div_ceil(self.lines_per_column).max(1)
    }

    /// Column holding `line`, clamped to the last column.
    pub fn column_of_line(&self, line: u32) -> u32 {
        (line / self.lines_per_column).min(self.column_count() - 1)
    }

    /// Placement of the body child at `node_index`.
    pub fn block_for_node(&self, node_index: usize) -> Option<&BlockPlacement> {
        self.blocks
            .iter()
            .find(|block| block.node_index == node_index)
    }

    /// Bottom edge of the last body-level element in an unpaginated flow.
    pub fn last_element_bottom(&self) -> Option<u32> {
        self.blocks
            .iter()
            .rev()
            .find(|block| block.is_element)
            .map(|block| block.end_line().saturating_mul(self.line_px))
    }
}

fn node_lines(node: &MarkupNode, chars_per_line: u32, gap: u32) -> u32 {
    match node {
        MarkupNode::Text(_) => text_lines(node.visible_chars(), chars_per_line),
        MarkupNode::Element(element) => element_lines(element, chars_per_line, gap),
    }
}

fn element_lines(element: &Element, chars_per_line: u32, gap: u32) -> u32 {
    if HIDDEN_TAGS.contains(&element.tag.as_str()) {
        return 0;
    }
    if !element.children.iter().any(is_block) {
        let chars = element
            .children
            .iter()
            .map(MarkupNode::visible_chars)
            .sum::<usize>();
        return text_lines(chars, chars_per_line).max(1);
    }

    // Mixed content: consecutive inline children share lines, blocks stack.
    let mut total = 0u32;
    let mut inline_chars = 0usize;
    let mut stacked = 0u32;
    let mut push = |lines: u32, total: &mut u32| {
        if lines == 0 {
            return;
        }
        if stacked > 0 {
            *total = total.saturating_add(gap);
        }
        *total = total.saturating_add(lines);
        stacked += 1;
    };
    for child in &element.children {
        if is_block(child) {
            push(text_lines(inline_chars, chars_per_line), &mut total);
            inline_chars = 0;
            push(node_lines(child, chars_per_line, gap), &mut total);
        } else if !child.is_blank_text() {
            inline_chars += child.visible_chars();
        }
    }
    push(text_lines(inline_chars, chars_per_line), &mut total);
    total.max(1)
}

fn is_block(node: &MarkupNode) -> bool {
    node.as_element()
        .is_some_and(|element| BLOCK_TAGS.contains(&element.tag.as_str()))
}

fn text_lines(chars: usize, chars_per_line: u32) -> u32 {
    let chars = u32::try_from(chars).unwrap_or(u32::MAX);
    chars.div_ceil(chars_per_line.max(1))
}
