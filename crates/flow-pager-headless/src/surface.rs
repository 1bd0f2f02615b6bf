//! [`RenderSurface`] implementation over the headless flow.

use std::collections::BTreeMap;

use flow_pager::{ClientSize, LineMetrics, RenderSurface};

use crate::dom::{parse_document, MarkupDocument, MarkupNode};
use crate::flow::{ColumnFlow, HeadlessMetrics};

/// In-memory rendering surface with deterministic column layout.
///
/// Markup that fails to parse leaves the surface with an empty body, the way a
/// browser would show a blank page. Resources for
/// [`navigate_to`](RenderSurface::navigate_to) are looked up in a map
/// registered with [`with_resource`](Self::with_resource).
#[derive(Clone, Debug)]
pub struct HeadlessSurface {
    client: ClientSize,
    metrics: HeadlessMetrics,
    document: MarkupDocument,
    resources: BTreeMap<String, String>,
    column_width: Option<u32>,
    visible: bool,
    scroll: u32,
    double_extent_quirk: bool,
    loads: usize,
}

impl HeadlessSurface {
    /// Empty surface with a `width` x `height` client area.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            client: ClientSize::new(width, height),
            metrics: HeadlessMetrics::default(),
            document: MarkupDocument::default(),
            resources: BTreeMap::new(),
            column_width: None,
            visible: true,
            scroll: 0,
            double_extent_quirk: false,
            loads: 0,
        }
    }

    /// Replace the text metrics.
    pub fn with_metrics(mut self, metrics: HeadlessMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Register markup served for `url`.
    pub fn with_resource(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.resources.insert(url.into(), markup.into());
        self
    }

    /// Report an extent of two column widths for content that fits in one
    /// column, as some engines do.
    pub fn with_double_extent_quirk(mut self, enabled: bool) -> Self {
        self.double_extent_quirk = enabled;
        self
    }

    /// Change the client area. Column width is left as is.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.client = ClientSize::new(width, height);
    }

    /// Change the body font size.
    pub fn set_font_size(&mut self, font_size_px: f32) {
        self.metrics.font_size_px = font_size_px;
    }

    /// Current text metrics.
    pub fn metrics(&self) -> HeadlessMetrics {
        self.metrics
    }

    /// Loaded document.
    pub fn document(&self) -> &MarkupDocument {
        &self.document
    }

    /// Column width in effect, if one was set.
    pub fn column_width(&self) -> Option<u32> {
        self.column_width
    }

    /// Whether the surface is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of content replacements so far.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// Lay out the current body with the current settings.
    pub fn flow(&self) -> ColumnFlow {
        let width = self.effective_column_width();
        ColumnFlow::compute(&self.document.body, width, self.client.height, &self.metrics)
    }

    fn effective_column_width(&self) -> u32 {
        self.column_width
            .filter(|width| *width > 0)
            .unwrap_or(self.client.width)
    }

    fn max_scroll(&self) -> u32 {
        self.content_extent().saturating_sub(self.client.width)
    }

    fn load_markup(&mut self, markup: &str) {
        self.document = match parse_document(markup) {
            Ok(document) => document,
            Err(err) => {
                log::warn!("headless: {}; showing an empty body", err);
                MarkupDocument::default()
            }
        };
        self.reset_after_load();
    }

    fn reset_after_load(&mut self) {
        self.scroll = 0;
        self.loads += 1;
    }
}

impl RenderSurface for HeadlessSurface {
    type Node = MarkupNode;
    type Document = MarkupDocument;

    async fn insert_markup(&mut self, markup: &str) {
        self.load_markup(markup);
        tokio::task::yield_now().await;
    }

    async fn navigate_to(&mut self, resource: &str) {
        match self.resources.get(resource).cloned() {
            Some(markup) => self.load_markup(&markup),
            None => {
                log::warn!("headless: no resource registered for '{}'", resource);
                self.document = MarkupDocument::default();
                self.reset_after_load();
            }
        }
        tokio::task::yield_now().await;
    }

    fn replace_body_nodes(&mut self, nodes: &[MarkupNode]) {
        self.document = MarkupDocument::from_body(nodes.to_vec());
        self.reset_after_load();
    }

    fn replace_document_root(&mut self, doc: &MarkupDocument) {
        self.document = doc.clone();
        self.reset_after_load();
    }

    fn set_base_href(&mut self, href: &str) {
        self.document.base_href = Some(href.to_string());
        self.document.has_head = true;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_column_width(&mut self, width: u32) {
        self.column_width = Some(width);
    }

    fn client_size(&self) -> ClientSize {
        self.client
    }

    fn content_extent(&self) -> u32 {
        if self.column_width.is_none_or(|width| width == 0) {
            return self.client.width;
        }
        let width = self.effective_column_width();
        let columns = self.flow().column_count();
        if self.double_extent_quirk && columns == 1 {
            return width.saturating_mul(2);
        }
        width.saturating_mul(columns)
    }

    fn font_size_signature(&self) -> String {
        format!("{}px", self.metrics.font_size_px)
    }

    fn body_line_metrics(&self) -> Option<LineMetrics> {
        Some(LineMetrics {
            line_height_px: self.metrics.font_size_px * self.metrics.line_height,
            font_size_px: self.metrics.font_size_px,
        })
    }

    fn set_body_line_height(&mut self, multiple: f32) {
        self.metrics.line_height = multiple;
    }

    fn last_rendered_element_bottom(&self) -> Option<u32> {
        let flow = ColumnFlow::compute(
            &self.document.body,
            self.effective_column_width(),
            u32::MAX,
            &self.metrics,
        );
        flow.last_element_bottom()
    }

    fn scroll_anchor_into_view(&mut self, fragment: &str) -> Option<u32> {
        let node_index = self
            .document
            .body
            .iter()
            .position(|node| node.contains_id(fragment))?;
        let flow = self.flow();
        let column = flow
            .block_for_node(node_index)
            .map(|block| flow.column_of_line(block.start_line))
            .unwrap_or(0);
        let offset = column.saturating_mul(self.effective_column_width());
        self.scroll = offset.min(self.max_scroll());
        Some(self.scroll)
    }

    fn scroll_offset(&self) -> u32 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll = offset.min(self.max_scroll());
    }
}
