//! Content source classification.
//!
//! A data source hands over loosely shaped descriptors: a bare markup string,
//! or a record carrying one of `html`, `url`, `nodes` or `doc`. This module
//! picks exactly one loading strategy for a descriptor by looking at which
//! fields are populated. It performs no I/O.

use core::fmt;

use crate::error::PagerError;

/// Loading strategy tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadStrategy {
    /// Markup text inserted directly into the surface.
    InlineMarkup,
    /// A resource the surface fetches and loads itself.
    ResourceReference,
    /// Body nodes copied into the surface.
    NodeList,
    /// A whole document whose root replaces the surface's root.
    Document,
}

impl LoadStrategy {
    /// Stable label for logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InlineMarkup => "inline-markup",
            Self::ResourceReference => "resource-reference",
            Self::NodeList => "node-list",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw content descriptor as supplied by a publication data source.
///
/// `N` is the surface's node type and `D` its document type.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceDescriptor<N, D> {
    /// The descriptor itself is a markup string.
    pub text: Option<String>,
    /// Markup field.
    pub html: Option<String>,
    /// Resource reference field.
    pub url: Option<String>,
    /// Node-list field.
    pub nodes: Option<Vec<N>>,
    /// Document field.
    pub doc: Option<D>,
}

impl<N, D> Default for SourceDescriptor<N, D> {
    fn default() -> Self {
        Self {
            text: None,
            html: None,
            url: None,
            nodes: None,
            doc: None,
        }
    }
}

impl<N, D> SourceDescriptor<N, D> {
    /// Descriptor that is a bare markup string.
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Descriptor with a markup field.
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            ..Self::default()
        }
    }

    /// Descriptor with a resource reference field.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Descriptor with a node-list field.
    pub fn nodes(nodes: Vec<N>) -> Self {
        Self {
            nodes: Some(nodes),
            ..Self::default()
        }
    }

    /// Descriptor with a document field.
    pub fn document(doc: D) -> Self {
        Self {
            doc: Some(doc),
            ..Self::default()
        }
    }
}

impl<N, D> From<&str> for SourceDescriptor<N, D> {
    fn from(value: &str) -> Self {
        Self::bare(value)
    }
}

impl<N, D> From<String> for SourceDescriptor<N, D> {
    fn from(value: String) -> Self {
        Self::bare(value)
    }
}

/// A descriptor reduced to the single payload its strategy loads.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentSource<N, D> {
    /// Markup text.
    Markup(String),
    /// Resource reference.
    Resource(String),
    /// Body nodes, in order.
    Nodes(Vec<N>),
    /// Whole document.
    Document(D),
}

impl<N, D> ContentSource<N, D> {
    /// Strategy tag for this payload.
    pub fn strategy(&self) -> LoadStrategy {
        match self {
            Self::Markup(_) => LoadStrategy::InlineMarkup,
            Self::Resource(_) => LoadStrategy::ResourceReference,
            Self::Nodes(_) => LoadStrategy::NodeList,
            Self::Document(_) => LoadStrategy::Document,
        }
    }
}

/// Classify a descriptor.
///
/// Precedence follows field inspection order: a non-empty markup field or a
/// bare string, then a non-empty resource reference, then a node list (an
/// empty list still counts), then a document.
pub fn resolve_source<N, D>(
    descriptor: SourceDescriptor<N, D>,
) -> Result<ContentSource<N, D>, PagerError> {
    let SourceDescriptor {
        text,
        html,
        url,
        nodes,
        doc,
    } = descriptor;

    if let Some(html) = html.filter(|html| !html.is_empty()) {
        return Ok(ContentSource::Markup(html));
    }
    if let Some(text) = text {
        return Ok(ContentSource::Markup(text));
    }
    if let Some(url) = url.filter(|url| !url.is_empty()) {
        return Ok(ContentSource::Resource(url));
    }
    if let Some(nodes) = nodes {
        return Ok(ContentSource::Nodes(nodes));
    }
    if let Some(doc) = doc {
        return Ok(ContentSource::Document(doc));
    }
    Err(PagerError::UnsupportedSourceKind)
}
