use std::collections::BTreeMap;

use crate::surface::{ClientSize, LineMetrics, RenderSurface, SourceDocument};

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FakeDocument {
    pub root: String,
    pub base: Option<String>,
}

impl SourceDocument for FakeDocument {
    fn base_href(&self) -> Option<&str> {
        self.base.as_deref()
    }
}

/// Surface double whose readings are set directly by the test.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedSurface {
    pub client: ClientSize,
    pub extent: u32,
    pub font_size: String,
    pub line_metrics: Option<LineMetrics>,
    pub line_height_multiple: Option<f32>,
    pub last_bottom: Option<u32>,
    pub anchors: BTreeMap<String, u32>,
    pub scroll: u32,
    pub cross_axis_resets: usize,
    pub column_width: Option<u32>,
    pub column_width_calls: usize,
    pub visible: bool,
    pub visibility_log: Vec<bool>,
    pub markup: Option<String>,
    pub navigated: Option<String>,
    pub body_nodes: Vec<String>,
    pub document: Option<FakeDocument>,
    pub base_href: Option<String>,
}

impl ScriptedSurface {
    pub fn new(width: u32, height: u32, extent: u32) -> Self {
        Self {
            client: ClientSize::new(width, height),
            extent,
            font_size: "16px".to_string(),
            last_bottom: Some(height / 2),
            ..Self::default()
        }
    }

    pub fn with_anchor(mut self, fragment: &str, offset: u32) -> Self {
        self.anchors.insert(fragment.to_string(), offset);
        self
    }

    fn clear_content(&mut self) {
        self.markup = None;
        self.navigated = None;
        self.body_nodes.clear();
        self.document = None;
    }
}

impl RenderSurface for ScriptedSurface {
    type Node = String;
    type Document = FakeDocument;

    async fn insert_markup(&mut self, markup: &str) {
        self.clear_content();
        self.markup = Some(markup.to_string());
        tokio::task::yield_now().await;
    }

    async fn navigate_to(&mut self, resource: &str) {
        self.clear_content();
        self.navigated = Some(resource.to_string());
        tokio::task::yield_now().await;
    }

    fn replace_body_nodes(&mut self, nodes: &[String]) {
        self.clear_content();
        self.body_nodes = nodes.to_vec();
    }

    fn replace_document_root(&mut self, doc: &FakeDocument) {
        self.clear_content();
        self.document = Some(doc.clone());
    }

    fn set_base_href(&mut self, href: &str) {
        self.base_href = Some(href.to_string());
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.visibility_log.push(visible);
    }

    fn set_column_width(&mut self, width: u32) {
        self.column_width = Some(width);
        self.column_width_calls += 1;
    }

    fn client_size(&self) -> ClientSize {
        self.client
    }

    fn content_extent(&self) -> u32 {
        self.extent
    }

    fn font_size_signature(&self) -> String {
        self.font_size.clone()
    }

    fn body_line_metrics(&self) -> Option<LineMetrics> {
        self.line_metrics
    }

    fn set_body_line_height(&mut self, multiple: f32) {
        self.line_height_multiple = Some(multiple);
    }

    fn last_rendered_element_bottom(&self) -> Option<u32> {
        self.last_bottom
    }

    fn scroll_anchor_into_view(&mut self, fragment: &str) -> Option<u32> {
        let offset = *self.anchors.get(fragment)?;
        self.scroll = offset;
        Some(offset)
    }

    fn scroll_offset(&self) -> u32 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll = offset;
    }

    fn reset_cross_axis_scroll(&mut self) {
        self.cross_axis_resets += 1;
    }
}
