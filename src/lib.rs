//! Column pagination and chapter location for reflowable publication content.
//!
//! A [`ContentUnit`] is one paginatable piece of a publication (typically one
//! spine item). Applying it to a [`Viewport`] loads its content into the
//! viewport's [`RenderSurface`], flows that content into columns one viewport
//! wide, counts the resulting pages and records where each declared
//! [`Chapter`] starts. The unit then answers page/chapter queries and decides
//! when a resize or restyle requires re-measuring.
//!
//! ```rust,no_run
//! use flow_pager::{Chapter, ContentUnit, RenderSurface, SourceDescriptor, Viewport, ViewportId};
//!
//! # async fn example<S: RenderSurface<Node = (), Document = D>, D: flow_pager::SourceDocument>(
//! #     surface: S,
//! # ) -> Result<(), flow_pager::PagerError> {
//! let unit = ContentUnit::new(
//!     "text/ch01.xhtml",
//!     0,
//!     vec![Chapter::with_fragment("Loomings", "loomings")],
//!     SourceDescriptor::html("<h1 id=\"loomings\">Loomings</h1><p>Call me Ishmael.</p>"),
//! )?;
//! let mut viewport = Viewport::new(ViewportId(0), surface);
//! unit.apply_to(&mut viewport).await?;
//! let pages = unit.last_page_number();
//! let start = unit.page_for_chapter(Some("loomings"))?;
//! # let _ = (pages, start);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod chapters;
mod component;
pub mod error;
mod events;
pub mod layout;
pub mod loader;
pub mod measure;
mod options;
pub mod source;
mod surface;
mod viewport;

#[cfg(test)]
mod test_support;

pub use chapters::{chapter_for_page, page_for_chapter, Chapter, LocateReport};
pub use component::{ApplyOutcome, ContentUnit};
pub use error::PagerError;
pub use events::UnitEvent;
pub use measure::{page_count_for, Dimensions, RawDimensions};
pub use options::{LayoutOptions, LoadOptions, MeasureOptions, PagerOptions};
pub use source::{resolve_source, ContentSource, LoadStrategy, SourceDescriptor};
pub use surface::{ClientSize, LineMetrics, RenderSurface, SourceDocument};
pub use viewport::{Viewport, ViewportId, ViewportSet};
