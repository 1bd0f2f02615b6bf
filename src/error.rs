//! Error types for pagination and chapter location.

use core::fmt;

use crate::viewport::ViewportId;

/// Pager error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PagerError {
    /// The source descriptor carries none of the supported payload fields.
    UnsupportedSourceKind,
    /// The viewport body has no rendered elements, so no page count exists.
    EmptyContent {
        /// Viewport that was measured.
        viewport: ViewportId,
    },
    /// A chapter fragment has no matching element in the rendered content.
    ///
    /// Never returned from `apply_to`; surfaced through
    /// [`LocateReport`](crate::LocateReport) and the event sink instead.
    AnchorNotFound {
        /// Fragment that could not be resolved.
        fragment: String,
    },
    /// No declared chapter carries the requested fragment.
    ChapterNotFound {
        /// Fragment that was queried.
        fragment: String,
    },
    /// The viewport reported a zero client width.
    ZeroWidth {
        /// Viewport that was measured.
        viewport: ViewportId,
    },
    /// A page or chapter query ran before any measurement or chapter location.
    NotMeasured,
    /// The viewport is not currently showing this content unit.
    NotBound {
        /// Viewport that was queried.
        viewport: ViewportId,
    },
}

impl PagerError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedSourceKind => "SOURCE_UNSUPPORTED",
            Self::EmptyContent { .. } => "MEASURE_EMPTY_CONTENT",
            Self::AnchorNotFound { .. } => "LOCATE_ANCHOR_NOT_FOUND",
            Self::ChapterNotFound { .. } => "MAP_CHAPTER_NOT_FOUND",
            Self::ZeroWidth { .. } => "MEASURE_ZERO_WIDTH",
            Self::NotMeasured => "MAP_NOT_MEASURED",
            Self::NotBound { .. } => "VIEWPORT_NOT_BOUND",
        }
    }
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedSourceKind => {
                write!(f, "source descriptor matches no loading strategy")
            }
            Self::EmptyContent { viewport } => {
                write!(f, "empty document body in viewport {}", viewport)
            }
            Self::AnchorNotFound { fragment } => {
                write!(f, "anchor not found for fragment '{}'", fragment)
            }
            Self::ChapterNotFound { fragment } => {
                write!(f, "no chapter declared for fragment '{}'", fragment)
            }
            Self::ZeroWidth { viewport } => {
                write!(f, "viewport {} has zero client width", viewport)
            }
            Self::NotMeasured => write!(f, "content unit has not been measured"),
            Self::NotBound { viewport } => {
                write!(f, "viewport {} is not showing this content unit", viewport)
            }
        }
    }
}

impl std::error::Error for PagerError {}
