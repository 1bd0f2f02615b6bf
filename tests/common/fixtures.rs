#![allow(dead_code)]

use flow_pager::{Chapter, ContentUnit, SourceDescriptor, Viewport, ViewportId};
use flow_pager_headless::{HeadlessSurface, MarkupDocument, MarkupNode};

pub type Unit = ContentUnit<MarkupNode, MarkupDocument>;

/// Viewport used by most scenarios: 40 characters per line and 20 lines per
/// column with the default headless metrics.
pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 480;

/// One 40-character line of text.
pub const LINE: &str = "It is a way I have of driving off spleen";

/// `count` one-line paragraphs with ids `p0`, `p1`, ... Each paragraph after
/// the first also takes a gap line, so `count` paragraphs use `2 * count - 1`
/// lines.
pub fn paragraphs(count: usize) -> String {
    (0..count)
        .map(|i| format!("<p id=\"p{}\">{}</p>", i, LINE))
        .collect()
}

/// A full XHTML chapter wrapping `body`.
pub fn xhtml_chapter(title: &str, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
         <head><title>{}</title></head>\n\
         <body>\n{}\n</body>\n</html>\n",
        title, body
    )
}

/// Forty paragraphs, four pages at the default viewport. `p0` opens chapter
/// one and `p20` (the top of page three) opens chapter two.
pub fn four_page_chapter() -> String {
    xhtml_chapter("Loomings", &paragraphs(40))
}

pub fn two_chapters() -> Vec<Chapter> {
    vec![
        Chapter::with_fragment("Loomings", "p0"),
        Chapter::with_fragment("The Carpet-Bag", "p20"),
    ]
}

pub fn markup_unit(id: &str, index: usize, markup: String, chapters: Vec<Chapter>) -> Unit {
    ContentUnit::new(id, index, chapters, SourceDescriptor::html(markup)).expect("markup unit")
}

pub fn headless_viewport(id: usize) -> Viewport<HeadlessSurface> {
    Viewport::new(ViewportId(id), HeadlessSurface::new(WIDTH, HEIGHT))
}
