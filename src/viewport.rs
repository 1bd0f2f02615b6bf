//! Viewports: rendering surfaces with a stable identity.

use core::fmt;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::surface::RenderSurface;

/// Stable viewport identity (for example, the page slot index in a reader).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewportId(pub usize);

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_UNIT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one content unit instance.
///
/// Two units built from the same spine position (say, the first item of two
/// different publications) get distinct tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct UnitToken(u64);

impl UnitToken {
    pub(crate) fn next() -> Self {
        Self(NEXT_UNIT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveUnit {
    token: UnitToken,
    index: usize,
}

/// A rendering surface plus the content unit it currently shows.
#[derive(Debug)]
pub struct Viewport<S> {
    id: ViewportId,
    surface: S,
    active: Option<ActiveUnit>,
}

impl<S: RenderSurface> Viewport<S> {
    /// Wrap a surface.
    pub fn new(id: ViewportId, surface: S) -> Self {
        Self {
            id,
            surface,
            active: None,
        }
    }

    /// Viewport identity.
    pub fn id(&self) -> ViewportId {
        self.id
    }

    /// Index of the content unit this viewport shows, if any.
    pub fn active_unit(&self) -> Option<usize> {
        self.active.map(|active| active.index)
    }

    pub(crate) fn shows(&self, token: UnitToken) -> bool {
        self.active.is_some_and(|active| active.token == token)
    }

    pub(crate) fn set_active_unit(&mut self, token: UnitToken, index: usize) {
        self.active = Some(ActiveUnit { token, index });
    }

    /// Borrow the surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutably borrow the surface.
    ///
    /// Resizing or restyling through this handle is what the change detector
    /// picks up on the next refresh.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

/// The set of viewports a reader owns, keyed by identity.
#[derive(Debug)]
pub struct ViewportSet<S> {
    viewports: BTreeMap<ViewportId, Viewport<S>>,
}

impl<S> Default for ViewportSet<S> {
    fn default() -> Self {
        Self {
            viewports: BTreeMap::new(),
        }
    }
}

impl<S: RenderSurface> ViewportSet<S> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a viewport, replacing any with the same id.
    pub fn insert(&mut self, viewport: Viewport<S>) -> Option<Viewport<S>> {
        self.viewports.insert(viewport.id(), viewport)
    }

    /// Insert a fresh viewport around `surface` and return its id.
    pub fn add(&mut self, id: ViewportId, surface: S) -> ViewportId {
        self.insert(Viewport::new(id, surface));
        id
    }

    /// Borrow a viewport.
    pub fn get(&self, id: ViewportId) -> Option<&Viewport<S>> {
        self.viewports.get(&id)
    }

    /// Mutably borrow a viewport.
    pub fn get_mut(&mut self, id: ViewportId) -> Option<&mut Viewport<S>> {
        self.viewports.get_mut(&id)
    }

    /// Remove a viewport.
    pub fn remove(&mut self, id: ViewportId) -> Option<Viewport<S>> {
        self.viewports.remove(&id)
    }

    /// Number of viewports.
    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    /// Iterate viewports in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Viewport<S>> {
        self.viewports.values()
    }

    /// Mutably iterate viewports in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Viewport<S>> {
        self.viewports.values_mut()
    }
}
