//! Post-load layout setup.

use crate::options::LayoutOptions;
use crate::surface::RenderSurface;

/// Prepare a freshly loaded surface for measurement.
///
/// Normalizes the body line-height, flows content into columns one client
/// width wide, and reveals the surface.
pub fn initialize<S: RenderSurface>(surface: &mut S, options: LayoutOptions) {
    if options.normalize_line_height {
        normalize_line_height(surface, options);
    }
    apply_column_width(surface);
    surface.set_visible(true);
}

/// Rewrite the body line-height as an absolute multiple of its font size.
///
/// Font-relative line heights make text jump upwards on later re-layout.
/// Returns the multiplier that was applied, if any.
pub fn normalize_line_height<S: RenderSurface>(
    surface: &mut S,
    options: LayoutOptions,
) -> Option<f32> {
    let metrics = surface.body_line_metrics()?;
    if !metrics.line_height_px.is_finite()
        || !metrics.font_size_px.is_finite()
        || metrics.font_size_px <= 0.0
    {
        return None;
    }
    let mut multiple = metrics.line_height_px / metrics.font_size_px;
    if let Some(max) = options.max_line_height {
        multiple = multiple.min(max);
    }
    if let Some(min) = options.min_line_height {
        multiple = multiple.max(min);
    }
    surface.set_body_line_height(multiple);
    Some(multiple)
}

/// Set the column width to the surface's client width and return it.
///
/// One column is one page.
pub fn apply_column_width<S: RenderSurface>(surface: &mut S) -> u32 {
    let width = surface.client_size().width;
    surface.set_column_width(width);
    width
}
