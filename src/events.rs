//! Lifecycle notifications emitted by a content unit.

use std::sync::{Arc, Mutex};

use crate::source::LoadStrategy;
use crate::viewport::ViewportId;

/// Notification delivered to a content unit's registered event sink.
///
/// The unit never waits on the receiver.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitEvent {
    /// The unit is about to replace the viewport's content.
    ContentChanging {
        unit_id: String,
        unit_index: usize,
        viewport: ViewportId,
        strategy: LoadStrategy,
    },
    /// Content was replaced and the initial layout pass applied.
    ContentChanged {
        unit_id: String,
        unit_index: usize,
        viewport: ViewportId,
    },
    /// Column width was (re)applied to a viewport.
    ColumnWidthApplied { viewport: ViewportId, width: u32 },
    /// A viewport was measured.
    Measured {
        viewport: ViewportId,
        page_count: usize,
    },
    /// A chapter fragment had no matching element; the chapter starts at 0.
    AnchorNotFound {
        viewport: ViewportId,
        fragment: String,
    },
}

pub(crate) type EventCallback = Arc<Mutex<Box<dyn FnMut(UnitEvent) + Send + 'static>>>;
pub(crate) type EventSink = Option<EventCallback>;
