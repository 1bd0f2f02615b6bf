//! Headless rendering surface for `flow-pager`.
//!
//! [`HeadlessSurface`] parses markup with `quick-xml` and flows it into columns
//! with fixed-advance text metrics, so page counts and chapter positions are
//! deterministic. It backs the integration tests, the benchmarks and the
//! `flow-pager-preview` tool.

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

pub mod dom;
pub mod flow;
mod surface;

pub use dom::{parse_document, parse_fragment, Element, HeadlessError, MarkupDocument, MarkupNode};
pub use flow::{BlockPlacement, ColumnFlow, HeadlessMetrics};
pub use surface::HeadlessSurface;
