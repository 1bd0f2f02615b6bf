use std::env;
use std::process::ExitCode;

use flow_pager::{
    ApplyOutcome, Chapter, ContentUnit, LoadOptions, PagerOptions, SourceDescriptor, UnitEvent,
    Viewport, ViewportId, ViewportSet,
};
use flow_pager_headless::{HeadlessMetrics, HeadlessSurface, MarkupDocument, MarkupNode};
use serde::Serialize;

const DEFAULT_WIDTH: u32 = 600;
const DEFAULT_HEIGHT: u32 = 800;
const PREVIEW_VIEWPORT: ViewportId = ViewportId(0);

#[derive(Clone, Debug)]
struct Args {
    input_path: String,
    width: u32,
    height: u32,
    font_size_px: f32,
    chapters: Vec<(String, String)>,
    resize: Option<(u32, u32)>,
    double_extent: bool,
    strip_doctype: bool,
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct PreviewReport {
    unit: String,
    strategy: String,
    metrics: HeadlessMetrics,
    measured: MeasuredReport,
    chapters: Vec<ChapterReport>,
    running_heads: Vec<RunningHead>,
    missing_anchors: Vec<String>,
    resized: Option<MeasuredReport>,
    events: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MeasuredReport {
    width: u32,
    height: u32,
    extent: u32,
    reported_extent: u32,
    font_size: String,
    page_count: usize,
}

#[derive(Debug, Serialize)]
struct ChapterReport {
    title: String,
    fragment: Option<String>,
    percent: Option<f32>,
    start_page: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RunningHead {
    page: usize,
    chapter: Option<String>,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let markup = std::fs::read_to_string(&cli.input_path)
        .map_err(|e| format!("cannot read '{}': {}", cli.input_path, e))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| e.to_string())?;
    let report = runtime.block_on(preview(&cli, &markup))?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

async fn preview(cli: &Args, markup: &str) -> Result<PreviewReport, String> {
    let chapters = cli
        .chapters
        .iter()
        .map(|(title, fragment)| Chapter::with_fragment(title.as_str(), fragment.as_str()))
        .collect();
    let options = PagerOptions {
        load: LoadOptions {
            strip_doctype: cli.strip_doctype,
            ..LoadOptions::default()
        },
        ..PagerOptions::default()
    };
    let mut unit = ContentUnit::<MarkupNode, MarkupDocument>::new(
        cli.input_path.as_str(),
        0,
        chapters,
        SourceDescriptor::html(markup),
    )
    .map_err(|e| e.to_string())?
    .with_options(options);

    let events = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&events);
    unit.set_event_sink(move |event: UnitEvent| {
        if let Ok(mut events) = sink.lock() {
            events.push(format!("{:?}", event));
        }
    });

    let metrics = HeadlessMetrics {
        font_size_px: cli.font_size_px,
        ..HeadlessMetrics::default()
    };
    let surface = HeadlessSurface::new(cli.width, cli.height)
        .with_metrics(metrics)
        .with_double_extent_quirk(cli.double_extent);
    let mut viewports = ViewportSet::new();
    viewports.insert(Viewport::new(PREVIEW_VIEWPORT, surface));

    let viewport = viewports
        .get_mut(PREVIEW_VIEWPORT)
        .ok_or_else(|| "preview viewport missing".to_string())?;
    let missing_anchors = match unit.apply_to(viewport).await.map_err(|e| e.to_string())? {
        ApplyOutcome::Applied { chapters, .. } => chapters.missing,
        ApplyOutcome::AlreadyApplied => Vec::new(),
    };
    let measured = measured_report(&unit)?;

    let resized = match cli.resize {
        Some((width, height)) => {
            if let Some(viewport) = viewports.get_mut(PREVIEW_VIEWPORT) {
                viewport.surface_mut().resize(width, height);
            }
            unit.refresh_if_changed(PREVIEW_VIEWPORT, &mut viewports)
                .map_err(|e| e.to_string())?;
            Some(measured_report(&unit)?)
        }
        None => None,
    };

    let page_count = unit.last_page_number().unwrap_or(1);
    let chapters = unit
        .chapters()
        .into_iter()
        .map(|chapter| ChapterReport {
            start_page: unit.page_for_chapter(chapter.fragment()).ok(),
            title: chapter.title().to_string(),
            fragment: chapter.fragment().map(str::to_string),
            percent: chapter.percent(),
        })
        .collect();
    let running_heads = (1..=page_count)
        .map(|page| RunningHead {
            page,
            chapter: unit
                .chapter_for_page(page)
                .map(|chapter| chapter.title().to_string()),
        })
        .collect();
    let events = events.lock().map(|events| events.clone()).unwrap_or_default();

    Ok(PreviewReport {
        unit: unit.id().to_string(),
        strategy: unit.strategy().to_string(),
        metrics,
        measured,
        chapters,
        running_heads,
        missing_anchors,
        resized,
        events,
    })
}

fn measured_report(
    unit: &ContentUnit<MarkupNode, MarkupDocument>,
) -> Result<MeasuredReport, String> {
    let dims = unit
        .dimensions_for(PREVIEW_VIEWPORT)
        .ok_or_else(|| "viewport was not measured".to_string())?;
    Ok(MeasuredReport {
        width: dims.width,
        height: dims.height,
        extent: dims.extent,
        reported_extent: dims.reported_extent,
        font_size: dims.font_size,
        page_count: dims.page_count,
    })
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return Err("an input file is required".to_string());
    }

    let mut cfg = Args {
        input_path: args[1].clone(),
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        font_size_px: HeadlessMetrics::default().font_size_px,
        chapters: Vec::new(),
        resize: None,
        double_extent: false,
        strip_doctype: false,
        pretty: false,
    };

    let mut i = 2usize;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cfg.width = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --width value '{}'", v))?;
                i += 2;
            }
            "--height" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--height requires a value".to_string())?;
                cfg.height = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --height value '{}'", v))?;
                i += 2;
            }
            "--font-size" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--font-size requires a value".to_string())?;
                cfg.font_size_px = v
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --font-size value '{}'", v))?;
                i += 2;
            }
            "--chapter" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--chapter requires a value".to_string())?;
                let (title, fragment) = v.split_once('=').unwrap_or((v.as_str(), ""));
                cfg.chapters.push((title.to_string(), fragment.to_string()));
                i += 2;
            }
            "--resize" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--resize requires a value".to_string())?;
                cfg.resize = Some(parse_size(v)?);
                i += 2;
            }
            "--double-extent" => {
                cfg.double_extent = true;
                i += 1;
            }
            "--strip-doctype" => {
                cfg.strip_doctype = true;
                i += 1;
            }
            "--pretty" => {
                cfg.pretty = true;
                i += 1;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
    }

    if cfg.width == 0 || cfg.height == 0 {
        return Err("--width and --height must be positive".to_string());
    }
    Ok(cfg)
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("invalid --resize value '{}', expected WIDTHxHEIGHT", value);
    let (width, height) = value.split_once('x').ok_or_else(invalid)?;
    let width = width.parse::<u32>().map_err(|_| invalid())?;
    let height = height.parse::<u32>().map_err(|_| invalid())?;
    Ok((width, height))
}

fn help_text() -> &'static str {
    r#"flow-pager-preview - paginate a markup file with the headless surface

USAGE:
  cargo run -p flow-pager-headless --bin flow-pager-preview -- <file.xhtml> [options]

OPTIONS:
  --width <px>                viewport width (default: 600)
  --height <px>               viewport height (default: 800)
  --font-size <px>            body font size (default: 16)
  --chapter <title=fragment>  declare a chapter; repeat in reading order
  --resize <WxH>              resize after the first measure and refresh
  --double-extent             emulate engines that report two pages for one
  --strip-doctype             drop the doctype before inserting markup
  --pretty                    pretty-print the JSON report
"#
}
