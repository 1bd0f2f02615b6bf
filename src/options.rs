//! Pager configuration.

/// Options for the content loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Collapse every whitespace run in inline markup to a single space.
    pub collapse_whitespace: bool,
    /// Strip the first `<!DOCTYPE ...>` declaration from inline markup.
    ///
    /// Some rendering engines refuse markup that starts with a doctype when it
    /// is injected rather than navigated to.
    pub strip_doctype: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
            strip_doctype: false,
        }
    }
}

impl LoadOptions {
    /// Preset for engines that reject injected doctype declarations.
    pub fn without_doctype() -> Self {
        Self {
            strip_doctype: true,
            ..Self::default()
        }
    }
}

/// Options for the layout initializer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
    /// Rewrite the body line-height as an absolute multiple of its font size.
    pub normalize_line_height: bool,
    /// Lower bound for the normalized multiplier. `None` keeps the exact ratio.
    pub min_line_height: Option<f32>,
    /// Upper bound for the normalized multiplier. `None` keeps the exact ratio.
    pub max_line_height: Option<f32>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            normalize_line_height: true,
            min_line_height: None,
            max_line_height: None,
        }
    }
}

impl LayoutOptions {
    /// Normalize and keep the multiplier within `[0.8, 3.0]`.
    pub fn clamped() -> Self {
        Self {
            min_line_height: Some(0.8),
            max_line_height: Some(3.0),
            ..Self::default()
        }
    }
}

/// Options for the dimension measurer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasureOptions {
    /// Resolve an extent of exactly twice the width using the last element's
    /// bottom edge.
    pub disambiguate_double_extent: bool,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            disambiguate_double_extent: true,
        }
    }
}

/// Aggregate pager options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PagerOptions {
    /// Loader options.
    pub load: LoadOptions,
    /// Layout initializer options.
    pub layout: LayoutOptions,
    /// Measurer options.
    pub measure: MeasureOptions,
}
