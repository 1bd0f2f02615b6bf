mod common;

use std::sync::{Arc, Mutex};

use common::fixtures::{
    four_page_chapter, headless_viewport, markup_unit, paragraphs, two_chapters, xhtml_chapter,
    Unit, HEIGHT, WIDTH,
};
use flow_pager::{
    ApplyOutcome, Chapter, Dimensions, LoadStrategy, LocateReport, PagerError, RenderSurface,
    UnitEvent, Viewport, ViewportId, ViewportSet,
};
use flow_pager_headless::HeadlessSurface;

fn applied(outcome: ApplyOutcome) -> (Dimensions, LocateReport) {
    match outcome {
        ApplyOutcome::Applied {
            dimensions,
            chapters,
        } => (dimensions, chapters),
        ApplyOutcome::AlreadyApplied => panic!("expected a fresh apply"),
    }
}

#[tokio::test]
async fn three_column_content_measures_three_pages() {
    let unit = markup_unit("ch01", 0, xhtml_chapter("Three", &paragraphs(25)), Vec::new());
    let mut viewport = headless_viewport(0);

    let (dims, _) = applied(unit.apply_to(&mut viewport).await.expect("apply"));
    assert_eq!(dims.width, WIDTH);
    assert_eq!(dims.height, HEIGHT);
    assert_eq!(dims.extent, 3 * WIDTH);
    assert_eq!(dims.font_size, "16px");
    assert_eq!(dims.page_count, 3);
    assert_eq!(unit.last_page_number(), Some(3));
}

#[tokio::test]
async fn doubled_extent_for_short_content_collapses_to_one_page() {
    let unit = markup_unit("short", 0, "<p>Call me Ishmael.</p>".to_string(), Vec::new());
    let surface = HeadlessSurface::new(WIDTH, HEIGHT).with_double_extent_quirk(true);
    let mut viewport = Viewport::new(ViewportId(0), surface);

    let (dims, _) = applied(unit.apply_to(&mut viewport).await.expect("apply"));
    assert_eq!(dims.reported_extent, 2 * WIDTH);
    assert_eq!(dims.extent, WIDTH);
    assert_eq!(dims.page_count, 1);
}

#[tokio::test]
async fn doubled_extent_with_overflowing_content_stays_two_pages() {
    // 15 paragraphs take 29 lines, one more than a column holds.
    let unit = markup_unit("two", 0, paragraphs(15), Vec::new());
    let mut viewport = headless_viewport(0);

    let (dims, _) = applied(unit.apply_to(&mut viewport).await.expect("apply"));
    assert_eq!(dims.extent, 2 * WIDTH);
    assert_eq!(dims.page_count, 2);
}

#[tokio::test]
async fn chapters_map_to_pages_both_ways() {
    let unit = markup_unit("ch01", 0, four_page_chapter(), two_chapters());
    let mut viewport = headless_viewport(0);
    let (dims, report) = applied(unit.apply_to(&mut viewport).await.expect("apply"));
    assert_eq!(dims.page_count, 4);
    assert_eq!(report.located, 2);

    let chapters = unit.chapters();
    assert_eq!(chapters[0].percent(), Some(0.0));
    assert_eq!(chapters[1].percent(), Some(0.5));

    assert_eq!(unit.page_for_chapter(Some("p0")), Ok(1));
    assert_eq!(unit.page_for_chapter(Some("p20")), Ok(3));
    assert_eq!(unit.page_for_chapter(None), Ok(1));

    let heads: Vec<_> = (1..=4)
        .map(|page| unit.chapter_for_page(page).map(|c| c.title().to_string()))
        .collect();
    assert_eq!(
        heads,
        vec![
            Some("Loomings".to_string()),
            Some("Loomings".to_string()),
            Some("The Carpet-Bag".to_string()),
            Some("The Carpet-Bag".to_string()),
        ]
    );

    // Location leaves the reader where it was.
    assert_eq!(viewport.surface().scroll_offset(), 0);
}

#[tokio::test]
async fn missing_anchor_starts_chapter_at_zero_and_is_reported() {
    let chapters = vec![
        Chapter::with_fragment("Loomings", "p0"),
        Chapter::with_fragment("Lost", "nowhere"),
    ];
    let mut unit = markup_unit("ch01", 0, four_page_chapter(), chapters);
    let events = record_events(&mut unit);
    let mut viewport = headless_viewport(2);

    let (_, report) = applied(unit.apply_to(&mut viewport).await.expect("apply"));
    assert_eq!(report.missing, vec!["nowhere".to_string()]);
    assert_eq!(unit.chapters()[1].percent(), Some(0.0));
    assert_eq!(unit.page_for_chapter(Some("nowhere")), Ok(1));
    assert!(events.lock().expect("events").contains(&UnitEvent::AnchorNotFound {
        viewport: ViewportId(2),
        fragment: "nowhere".to_string(),
    }));
}

#[tokio::test]
async fn unknown_chapter_fragment_is_an_error() {
    let unit = markup_unit("ch01", 0, four_page_chapter(), two_chapters());
    let mut viewport = headless_viewport(0);
    unit.apply_to(&mut viewport).await.expect("apply");
    let err = unit.page_for_chapter(Some("p7")).expect_err("undeclared");
    assert_eq!(err.code(), "MAP_CHAPTER_NOT_FOUND");
}

#[tokio::test]
async fn empty_body_is_reported_and_leaves_nothing_cached() {
    let unit = markup_unit(
        "blank",
        0,
        "<html><head/><body></body></html>".to_string(),
        two_chapters(),
    );
    let mut viewport = headless_viewport(0);

    let err = unit.apply_to(&mut viewport).await.expect_err("empty body");
    assert_eq!(
        err,
        PagerError::EmptyContent {
            viewport: ViewportId(0)
        }
    );
    assert_eq!(unit.last_page_number(), None);
    assert_eq!(unit.dimensions_for(ViewportId(0)), None);
    assert_eq!(unit.chapter_for_page(1), None);
    assert!(unit.chapters().iter().all(|chapter| !chapter.is_located()));
    // The viewport still shows the unit, so a retry is a no-op.
    assert!(unit.currently_applying_to(&viewport));
}

#[tokio::test]
async fn body_with_only_loose_text_is_empty() {
    let unit = markup_unit("loose", 0, "<body>just words</body>".to_string(), Vec::new());
    let mut viewport = headless_viewport(0);
    let err = unit.apply_to(&mut viewport).await.expect_err("no elements");
    assert_eq!(err.code(), "MEASURE_EMPTY_CONTENT");
}

#[tokio::test]
async fn zero_width_viewport_is_rejected() {
    let unit = markup_unit("ch01", 0, paragraphs(3), Vec::new());
    let mut viewport = Viewport::new(ViewportId(5), HeadlessSurface::new(0, HEIGHT));
    let err = unit.apply_to(&mut viewport).await.expect_err("zero width");
    assert_eq!(
        err,
        PagerError::ZeroWidth {
            viewport: ViewportId(5)
        }
    );
}

#[tokio::test]
async fn apply_emits_lifecycle_events_in_order() {
    let mut unit = markup_unit("ch01", 7, four_page_chapter(), two_chapters());
    let events = record_events(&mut unit);
    let mut viewport = headless_viewport(1);
    unit.apply_to(&mut viewport).await.expect("apply");

    let events = events.lock().expect("events").clone();
    assert_eq!(
        events,
        vec![
            UnitEvent::ContentChanging {
                unit_id: "ch01".to_string(),
                unit_index: 7,
                viewport: ViewportId(1),
                strategy: LoadStrategy::InlineMarkup,
            },
            UnitEvent::ContentChanged {
                unit_id: "ch01".to_string(),
                unit_index: 7,
                viewport: ViewportId(1),
            },
            UnitEvent::ColumnWidthApplied {
                viewport: ViewportId(1),
                width: WIDTH,
            },
            UnitEvent::Measured {
                viewport: ViewportId(1),
                page_count: 4,
            },
        ]
    );
    assert!(viewport.surface().is_visible());
    assert_eq!(viewport.surface().column_width(), Some(WIDTH));
}

#[tokio::test]
async fn switching_units_reloads_the_viewport() {
    let first = markup_unit("ch01", 0, four_page_chapter(), two_chapters());
    let second = markup_unit("ch02", 1, paragraphs(3), Vec::new());
    let mut viewport = headless_viewport(0);

    first.apply_to(&mut viewport).await.expect("first");
    second.apply_to(&mut viewport).await.expect("second");
    assert!(!first.currently_applying_to(&viewport));
    assert_eq!(viewport.active_unit(), Some(1));
    assert_eq!(second.last_page_number(), Some(1));

    let outcome = first.apply_to(&mut viewport).await.expect("back to first");
    assert!(matches!(outcome, ApplyOutcome::Applied { .. }));
    assert_eq!(viewport.surface().load_count(), 3);
}

#[tokio::test]
async fn units_from_different_books_share_an_index() {
    let first = markup_unit("book-a/ch01", 0, four_page_chapter(), two_chapters());
    let second = markup_unit("book-b/ch01", 0, paragraphs(3), Vec::new());
    let mut viewports = ViewportSet::new();
    viewports.insert(headless_viewport(0));

    let viewport = viewports.get_mut(ViewportId(0)).expect("viewport");
    first.apply_to(viewport).await.expect("first");
    let outcome = second.apply_to(viewport).await.expect("second");
    assert!(matches!(outcome, ApplyOutcome::Applied { .. }));
    assert_eq!(viewport.surface().document().body.len(), 3);
    assert_eq!(second.last_page_number(), Some(1));
    assert!(!first.currently_applying_to(viewport));

    assert_eq!(
        first.refresh_if_changed(ViewportId(0), &mut viewports),
        Err(PagerError::NotBound { viewport: ViewportId(0) })
    );
    assert_eq!(second.refresh_if_changed(ViewportId(0), &mut viewports), Ok(false));
}

#[tokio::test]
async fn page_counts_and_percents_stay_in_range() {
    for count in [1usize, 2, 9, 10, 11, 30, 57] {
        let chapters = (0..count)
            .step_by(5)
            .map(|i| Chapter::with_fragment(format!("Part {}", i), format!("p{}", i)))
            .collect();
        let unit: Unit = markup_unit("range", 0, paragraphs(count), chapters);
        let mut viewport = headless_viewport(0);
        let (dims, _) = applied(unit.apply_to(&mut viewport).await.expect("apply"));

        let lines = 2 * count as u32 - 1;
        let expected_pages = lines.div_ceil(HEIGHT / 24).max(1) as usize;
        assert_eq!(dims.page_count, expected_pages, "{} paragraphs", count);
        for chapter in unit.chapters() {
            let percent = chapter.percent().expect("located");
            assert!((0.0..=1.0).contains(&percent));
            let page = unit.page_for_chapter(chapter.fragment()).expect("page");
            assert!(page >= 1 && page <= dims.page_count + 1);
        }
        assert!(
            unit.chapters()
                .windows(2)
                .all(|pair| pair[0].percent() <= pair[1].percent()),
            "{} paragraphs: chapter percents out of order",
            count
        );
    }
}

fn record_events(unit: &mut Unit) -> Arc<Mutex<Vec<UnitEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    unit.set_event_sink(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push(event);
        }
    });
    seen
}
