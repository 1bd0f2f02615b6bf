//! Dimension measurement and page counting.

use crate::error::PagerError;
use crate::options::MeasureOptions;
use crate::surface::RenderSurface;
use crate::viewport::ViewportId;

/// A raw reading of a viewport, before any page arithmetic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawDimensions {
    /// Client width.
    pub width: u32,
    /// Client height.
    pub height: u32,
    /// Content extent exactly as the surface reported it.
    pub extent: u32,
    /// Opaque font-size signature.
    pub font_size: String,
}

/// Cached measurement of a content unit in one viewport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Client width (one page).
    pub width: u32,
    /// Client height.
    pub height: u32,
    /// Content extent after disambiguation.
    pub extent: u32,
    /// Content extent as reported, kept for change detection.
    pub reported_extent: u32,
    /// Opaque font-size signature.
    pub font_size: String,
    /// Number of pages, always at least 1.
    pub page_count: usize,
}

impl Dimensions {
    /// Whether a raw reading matches this measurement on every tracked field.
    pub fn matches(&self, raw: &RawDimensions) -> bool {
        self.width == raw.width
            && self.height == raw.height
            && self.reported_extent == raw.extent
            && self.font_size == raw.font_size
    }
}

/// Pages needed to show `extent` in columns of `width`.
///
/// Never less than 1. A zero `width` is a caller error and also yields 1.
pub fn page_count_for(extent: u32, width: u32) -> usize {
    if width == 0 {
        return 1;
    }
    (extent.div_ceil(width) as usize).max(1)
}

/// Take a raw reading of the surface.
pub fn raw_dimensions<S: RenderSurface>(surface: &S) -> RawDimensions {
    let client = surface.client_size();
    RawDimensions {
        width: client.width,
        height: client.height,
        extent: surface.content_extent(),
        font_size: surface.font_size_signature(),
    }
}

/// Measure the surface and derive its page count.
///
/// Some engines report an extent of exactly two page widths for content that
/// fits on one page. When that happens the bottom edge of the last rendered
/// element decides: past the client height the content really spans two
/// pages, otherwise it is collapsed to one.
pub fn measure<S: RenderSurface>(
    surface: &S,
    viewport: ViewportId,
    options: MeasureOptions,
) -> Result<Dimensions, PagerError> {
    let raw = raw_dimensions(surface);
    if raw.width == 0 {
        return Err(PagerError::ZeroWidth { viewport });
    }
    let Some(last_bottom) = surface.last_rendered_element_bottom() else {
        log::warn!("measure: empty document body in viewport {}", viewport);
        return Err(PagerError::EmptyContent { viewport });
    };

    let mut extent = raw.extent;
    if options.disambiguate_double_extent && raw.width.checked_mul(2) == Some(raw.extent) {
        extent = if last_bottom > raw.height {
            raw.extent
        } else {
            raw.width
        };
        log::debug!(
            "measure: double extent in viewport {} resolved to {} (last bottom {} vs height {})",
            viewport,
            extent,
            last_bottom,
            raw.height
        );
    }

    let page_count = page_count_for(extent, raw.width);
    Ok(Dimensions {
        width: raw.width,
        height: raw.height,
        extent,
        reported_extent: raw.extent,
        font_size: raw.font_size,
        page_count,
    })
}
