//! Content units: one paginatable piece of a publication and its per-viewport
//! measurement state.
//!
//! A unit is applied to a viewport (load, lay out, measure, locate chapters),
//! then kept current with [`ContentUnit::refresh_if_changed`]. Page and chapter
//! queries answer from the cached measurement.
//!
//! All state lives behind a mutex that is never held across an await, so the
//! same unit can be applied to several viewports concurrently.

use core::fmt;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::chapters::{self, Chapter, LocateReport};
use crate::error::PagerError;
use crate::events::{EventSink, UnitEvent};
use crate::layout;
use crate::loader;
use crate::measure::{self, Dimensions};
use crate::options::PagerOptions;
use crate::source::{resolve_source, ContentSource, LoadStrategy, SourceDescriptor};
use crate::surface::RenderSurface;
use crate::viewport::{UnitToken, Viewport, ViewportId, ViewportSet};

/// Result of [`ContentUnit::apply_to`].
#[derive(Clone, Debug, PartialEq)]
pub enum ApplyOutcome {
    /// The viewport was already showing this unit; nothing was done.
    AlreadyApplied,
    /// Content was loaded, measured and its chapters located.
    Applied {
        /// Measurement taken right after layout.
        dimensions: Dimensions,
        /// Chapter location outcome.
        chapters: LocateReport,
    },
}

#[derive(Debug, Default)]
struct UnitState {
    chapters: Vec<Chapter>,
    bindings: BTreeMap<ViewportId, Option<Dimensions>>,
    last_measured: Option<ViewportId>,
}

impl UnitState {
    fn dimensions(&self, viewport: ViewportId) -> Option<&Dimensions> {
        self.bindings.get(&viewport).and_then(Option::as_ref)
    }

    fn page_count(&self) -> Option<usize> {
        self.last_measured
            .and_then(|viewport| self.dimensions(viewport))
            .map(|dims| dims.page_count)
    }
}

/// One paginatable piece of a publication.
///
/// `N` and `D` are the node and document types of the surfaces it is applied
/// to.
pub struct ContentUnit<N, D> {
    token: UnitToken,
    id: String,
    index: usize,
    source: ContentSource<N, D>,
    options: PagerOptions,
    state: Mutex<UnitState>,
    event_sink: EventSink,
}

impl<N, D> fmt::Debug for ContentUnit<N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentUnit")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("strategy", &self.source.strategy())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<N, D> ContentUnit<N, D> {
    /// Create a unit, resolving its source descriptor once.
    pub fn new(
        id: impl Into<String>,
        index: usize,
        chapters: Vec<Chapter>,
        source: SourceDescriptor<N, D>,
    ) -> Result<Self, PagerError> {
        let source = resolve_source(source)?;
        Ok(Self {
            token: UnitToken::next(),
            id: id.into(),
            index,
            source,
            options: PagerOptions::default(),
            state: Mutex::new(UnitState {
                chapters,
                ..UnitState::default()
            }),
            event_sink: None,
        })
    }

    /// Replace the pager options.
    pub fn with_options(mut self, options: PagerOptions) -> Self {
        self.options = options;
        self
    }

    /// Register or replace the event sink.
    pub fn set_event_sink<F>(&mut self, sink: F)
    where
        F: FnMut(UnitEvent) + Send + 'static,
    {
        self.event_sink = Some(Arc::new(Mutex::new(Box::new(sink))));
    }

    fn emit(&self, event: UnitEvent) {
        let Some(sink) = &self.event_sink else {
            return;
        };
        if let Ok(mut sink) = sink.lock() {
            sink(event);
        }
    }

    fn state(&self) -> MutexGuard<'_, UnitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identity within the publication.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordinal position among sibling units.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Loading strategy chosen for the source.
    pub fn strategy(&self) -> LoadStrategy {
        self.source.strategy()
    }

    /// Options in effect.
    pub fn options(&self) -> PagerOptions {
        self.options
    }

    /// Snapshot of the chapter list.
    pub fn chapters(&self) -> Vec<Chapter> {
        self.state().chapters.clone()
    }

    /// Viewports this unit has been applied to, in id order.
    pub fn bound_viewports(&self) -> Vec<ViewportId> {
        self.state().bindings.keys().copied().collect()
    }

    /// Cached measurement for a viewport.
    pub fn dimensions_for(&self, viewport: ViewportId) -> Option<Dimensions> {
        self.state().dimensions(viewport).cloned()
    }

    /// Page count from the most recent measurement, if any.
    pub fn last_page_number(&self) -> Option<usize> {
        self.state().page_count()
    }

    /// Page count cached for one viewport.
    pub fn last_page_number_in(&self, viewport: ViewportId) -> Option<usize> {
        self.state().dimensions(viewport).map(|dims| dims.page_count)
    }

    /// The chapter that starts on or most recently before `page` (1-based).
    ///
    /// Useful as a running head.
    pub fn chapter_for_page(&self, page: usize) -> Option<Chapter> {
        let state = self.state();
        let page_count = state.page_count()?;
        chapters::chapter_for_page(&state.chapters, page_count, page).cloned()
    }

    /// The page on which the chapter with `fragment` starts.
    ///
    /// An absent or empty fragment always means page 1.
    pub fn page_for_chapter(&self, fragment: Option<&str>) -> Result<usize, PagerError> {
        let state = self.state();
        let page_count = state.page_count().unwrap_or(0);
        chapters::page_for_chapter(&state.chapters, page_count, fragment)
    }

    /// Whether `viewport` is currently showing this unit instance.
    ///
    /// Identity is per instance: another unit with the same id or index is a
    /// different unit.
    pub fn currently_applying_to<S: RenderSurface>(&self, viewport: &Viewport<S>) -> bool {
        viewport.shows(self.token)
    }
}

impl<N, D> ContentUnit<N, D> {
    /// Make this unit the content of `viewport`: load it, lay it out, measure
    /// it and locate its chapters.
    ///
    /// Does nothing if the viewport already shows this unit. Must not be
    /// called again on a viewport whose previous apply is still pending.
    pub async fn apply_to<S>(&self, viewport: &mut Viewport<S>) -> Result<ApplyOutcome, PagerError>
    where
        S: RenderSurface<Node = N, Document = D>,
    {
        if self.currently_applying_to(viewport) {
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        let viewport_id = viewport.id();
        self.state().bindings.insert(viewport_id, None);
        self.emit(UnitEvent::ContentChanging {
            unit_id: self.id.clone(),
            unit_index: self.index,
            viewport: viewport_id,
            strategy: self.source.strategy(),
        });

        viewport.set_active_unit(self.token, self.index);
        let surface = viewport.surface_mut();
        surface.set_visible(false);
        loader::load(surface, &self.source, self.options.load).await;

        layout::initialize(surface, self.options.layout);
        self.emit(UnitEvent::ContentChanged {
            unit_id: self.id.clone(),
            unit_index: self.index,
            viewport: viewport_id,
        });
        self.emit(UnitEvent::ColumnWidthApplied {
            viewport: viewport_id,
            width: surface.client_size().width,
        });

        let dimensions = self.measure_into(viewport_id, surface)?;
        let chapters = self.locate_chapters(viewport_id, surface, dimensions.extent);
        log::debug!(
            "apply: unit {} -> viewport {}: {} pages, {} chapters located",
            self.id,
            viewport_id,
            dimensions.page_count,
            chapters.located
        );
        Ok(ApplyOutcome::Applied {
            dimensions,
            chapters,
        })
    }

    /// Re-measure `target` if its size, extent or font size changed since the
    /// last measurement.
    ///
    /// On change the column width is re-applied to every viewport in
    /// `viewports` that currently shows this unit before `target` is
    /// re-measured. Returns whether anything changed; a viewport with no cached
    /// measurement counts as changed.
    pub fn refresh_if_changed<S>(
        &self,
        target: ViewportId,
        viewports: &mut ViewportSet<S>,
    ) -> Result<bool, PagerError>
    where
        S: RenderSurface<Node = N, Document = D>,
    {
        let raw = {
            let viewport = viewports
                .get(target)
                .filter(|viewport| self.currently_applying_to(viewport))
                .ok_or(PagerError::NotBound { viewport: target })?;
            measure::raw_dimensions(viewport.surface())
        };
        let unchanged = self
            .state()
            .dimensions(target)
            .is_some_and(|cached| cached.matches(&raw));
        if unchanged {
            return Ok(false);
        }

        for viewport in viewports
            .iter_mut()
            .filter(|viewport| self.currently_applying_to(viewport))
        {
            let width = layout::apply_column_width(viewport.surface_mut());
            self.emit(UnitEvent::ColumnWidthApplied {
                viewport: viewport.id(),
                width,
            });
        }

        let viewport = viewports
            .get(target)
            .ok_or(PagerError::NotBound { viewport: target })?;
        self.measure_into(target, viewport.surface())?;
        Ok(true)
    }

    fn measure_into<S: RenderSurface>(
        &self,
        viewport: ViewportId,
        surface: &S,
    ) -> Result<Dimensions, PagerError> {
        let dimensions = measure::measure(surface, viewport, self.options.measure)?;
        {
            let mut state = self.state();
            state.bindings.insert(viewport, Some(dimensions.clone()));
            state.last_measured = Some(viewport);
        }
        self.emit(UnitEvent::Measured {
            viewport,
            page_count: dimensions.page_count,
        });
        Ok(dimensions)
    }

    fn locate_chapters<S: RenderSurface>(
        &self,
        viewport: ViewportId,
        surface: &mut S,
        extent: u32,
    ) -> LocateReport {
        let report = {
            let mut state = self.state();
            chapters::locate_chapters(surface, &mut state.chapters, extent)
        };
        for fragment in &report.missing {
            self.emit(UnitEvent::AnchorNotFound {
                viewport,
                fragment: fragment.clone(),
            });
        }
        report
    }
}
