//! Chapter records, chapter location, and page/chapter mapping.

use crate::error::PagerError;
use crate::surface::RenderSurface;

/// A named sub-section of a content unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Chapter {
    title: String,
    fragment: Option<String>,
    percent: Option<f32>,
}

impl Chapter {
    /// Chapter starting at the top of the content unit.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fragment: None,
            percent: None,
        }
    }

    /// Chapter starting at the element with id `fragment`.
    ///
    /// An empty fragment is the same as none.
    pub fn with_fragment(title: impl Into<String>, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        Self {
            title: title.into(),
            fragment: (!fragment.is_empty()).then_some(fragment),
            percent: None,
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Anchor id, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Start position as a fraction of the content extent, once located.
    pub fn percent(&self) -> Option<f32> {
        self.percent
    }

    /// Whether the chapter has been located.
    pub fn is_located(&self) -> bool {
        self.percent.is_some()
    }
}

/// Outcome of a chapter location pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocateReport {
    /// The pass was skipped because chapters were already located.
    pub skipped: bool,
    /// Chapters whose anchor was found.
    pub located: usize,
    /// Fragments with no matching element; those chapters start at 0.
    pub missing: Vec<String>,
}

/// Locate every chapter's anchor and record its start as a fraction of
/// `extent`.
///
/// Runs once per chapter list: if the first chapter already has a percent the
/// pass is skipped. The surface's scroll position is restored afterwards.
pub fn locate_chapters<S: RenderSurface>(
    surface: &mut S,
    chapters: &mut [Chapter],
    extent: u32,
) -> LocateReport {
    if chapters.first().is_some_and(Chapter::is_located) {
        return LocateReport {
            skipped: true,
            ..LocateReport::default()
        };
    }

    let mut report = LocateReport::default();
    let previous_offset = surface.scroll_offset();
    for chapter in chapters.iter_mut() {
        chapter.percent = Some(0.0);
        let Some(fragment) = chapter.fragment.as_deref() else {
            continue;
        };
        match surface.scroll_anchor_into_view(fragment) {
            Some(offset) => {
                chapter.percent = Some(offset_to_percent(offset, extent));
                report.located += 1;
            }
            None => {
                log::warn!("locate: anchor not found for fragment '{}'", fragment);
                report.missing.push(fragment.to_string());
            }
        }
    }
    surface.reset_cross_axis_scroll();
    surface.set_scroll_offset(previous_offset);
    report
}

fn offset_to_percent(offset: u32, extent: u32) -> f32 {
    if extent == 0 {
        return 0.0;
    }
    (offset as f32 / extent as f32).clamp(0.0, 1.0)
}

/// The chapter that starts on or most recently before `page` (1-based).
/// Page 0 is not a page and maps to no chapter.
///
/// Chapters are scanned in declared order and the scan stops at the first
/// chapter starting after the page, so misordered declarations misattribute.
pub fn chapter_for_page(chapters: &[Chapter], page_count: usize, page: usize) -> Option<&Chapter> {
    if page == 0 || page_count == 0 {
        return None;
    }
    let position = (page - 1) as f32 / page_count as f32;
    let mut candidate = None;
    for chapter in chapters {
        match chapter.percent {
            Some(percent) if position >= percent => candidate = Some(chapter),
            _ => break,
        }
    }
    candidate
}

/// The 1-based page on which the chapter with `fragment` starts.
///
/// An absent or empty fragment means the first page.
pub fn page_for_chapter(
    chapters: &[Chapter],
    page_count: usize,
    fragment: Option<&str>,
) -> Result<usize, PagerError> {
    let Some(fragment) = fragment.filter(|f| !f.is_empty()) else {
        return Ok(1);
    };
    let chapter = chapters
        .iter()
        .find(|chapter| chapter.fragment() == Some(fragment))
        .ok_or_else(|| PagerError::ChapterNotFound {
            fragment: fragment.to_string(),
        })?;
    let percent = chapter.percent.ok_or(PagerError::NotMeasured)?;
    if page_count == 0 {
        return Err(PagerError::NotMeasured);
    }
    Ok((percent * page_count as f32).round() as usize + 1)
}
