//! Rendering-surface capabilities the pager drives.
//!
//! The pager never lays text out itself. A surface owns the rendered content,
//! flows it into columns of the width it is told, and reports extents back.
//! Browser frames, webviews and the headless backend all sit behind this trait.

use core::future::Future;

/// Usable client size of a viewport, in layout units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClientSize {
    /// Client width.
    pub width: u32,
    /// Client height.
    pub height: u32,
}

impl ClientSize {
    /// Create a client size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Resolved text-flow metrics of the content body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    /// Computed line height in layout units.
    pub line_height_px: f32,
    /// Computed font size in layout units.
    pub font_size_px: f32,
}

/// Document payload capabilities the loader needs.
pub trait SourceDocument {
    /// Value of the document's base-reference element, if it declares one.
    fn base_href(&self) -> Option<&str>;
}

/// A rendering surface that can host one content unit at a time.
pub trait RenderSurface {
    /// Content node type accepted by [`replace_body_nodes`](Self::replace_body_nodes).
    type Node;
    /// Document type accepted by [`replace_document_root`](Self::replace_document_root).
    type Document: SourceDocument;

    /// Replace all content with the given markup. Resolves once the surface
    /// has finished loading it.
    fn insert_markup(&mut self, markup: &str) -> impl Future<Output = ()>;

    /// Replace all content by loading a resource. Resolves once the surface's
    /// own load completes.
    fn navigate_to(&mut self, resource: &str) -> impl Future<Output = ()>;

    /// Replace the body with deep copies of `nodes`, in order. Synchronous.
    fn replace_body_nodes(&mut self, nodes: &[Self::Node]);

    /// Replace the root element with a deep copy of the document's root.
    fn replace_document_root(&mut self, doc: &Self::Document);

    /// Set the base reference used to resolve relative references, creating
    /// a head section when the content has none.
    fn set_base_href(&mut self, href: &str);

    /// Show or hide the surface.
    fn set_visible(&mut self, visible: bool);

    /// Flow content into columns of exactly `width`.
    fn set_column_width(&mut self, width: u32);

    /// Usable client size.
    fn client_size(&self) -> ClientSize;

    /// Total scrollable size of the laid-out content along the pagination axis.
    fn content_extent(&self) -> u32;

    /// Opaque signature of the body's resolved font size.
    fn font_size_signature(&self) -> String;

    /// Computed body line metrics, or `None` when line-height is not numeric.
    fn body_line_metrics(&self) -> Option<LineMetrics>;

    /// Set the body line-height as a multiple of its font size.
    fn set_body_line_height(&mut self, multiple: f32);

    /// Bottom edge of the last rendered element in the body, or `None` when
    /// the body has no rendered elements.
    fn last_rendered_element_bottom(&self) -> Option<u32>;

    /// Find the element with id `fragment`, climb to its ancestor that is a
    /// direct child of the body, scroll that into view and return the
    /// resulting scroll offset along the pagination axis.
    ///
    /// Returns `None` when no element carries the id.
    fn scroll_anchor_into_view(&mut self, fragment: &str) -> Option<u32>;

    /// Current scroll offset along the pagination axis.
    fn scroll_offset(&self) -> u32;

    /// Set the scroll offset along the pagination axis.
    fn set_scroll_offset(&mut self, offset: u32);

    /// Reset scrolling on the axis perpendicular to pagination.
    fn reset_cross_axis_scroll(&mut self) {}
}
