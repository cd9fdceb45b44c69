// src/main.rs
use std::path::{Path, PathBuf};

use clap::Parser;

use lectio_extractor::extractors::{Backend, ExtractionRules, Instrument, NoopInstrument, ScheduleExtractor, StageTimer};
use lectio_extractor::lectio::client::{self, ScheduleRequest, DEFAULT_MAX_PAGE_BYTES};
use lectio_extractor::lectio::ScheduleResponse;
use lectio_extractor::storage::StorageManager;
use lectio_extractor::utils::{self, AppError};

/// Command Line Interface for the Lectio weekly schedule extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Read a saved schedule page instead of fetching one
    #[arg(short, long, conflicts_with = "gym_id")]
    input: Option<PathBuf>,

    /// School (gymnasium) id used in portal URLs
    #[arg(short, long, required_unless_present = "input")]
    gym_id: Option<String>,

    /// Portal week parameter, e.g. 102024 (defaults to the current week)
    #[arg(short, long)]
    week: Option<String>,

    /// autologinkeyV2 cookie value (or LECTIO_COOKIE)
    #[arg(long)]
    cookie: Option<String>,

    /// ASP.NET_SessionId value (or LECTIO_SESSION)
    #[arg(long)]
    session: Option<String>,

    /// Output directory for extracted schedules
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Use the regex scanner instead of the DOM parser
    #[arg(long)]
    scanner: bool,

    /// JSON file overriding labels, markers and thresholds
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Debug mode - save the raw page and an annotated copy
    #[arg(short, long)]
    debug: bool,

    /// Print per-stage timings after extraction
    #[arg(long)]
    timings: bool,

    /// Skip writing when the schedule hash matches this value
    #[arg(long)]
    if_none_match: Option<String>,

    /// Skip writing when the hash matches the week already saved in the output directory
    #[arg(long)]
    skip_unchanged: bool,

    /// Refuse pages larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_PAGE_BYTES)]
    max_page_bytes: usize,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    utils::logging::setup_logging(if args.verbose { "debug" } else { "info" });
    tracing::info!("Starting processing: {}", redacted(&args));

    let rules = match &args.rules {
        Some(path) => load_rules(path)?,
        None => ExtractionRules::default(),
    };

    let html = match &args.input {
        Some(path) => {
            tracing::info!("Reading schedule page from {}", path.display());
            let html = std::fs::read_to_string(path)?;
            if html.len() > args.max_page_bytes {
                return Err(AppError::Config(format!(
                    "{} is {} bytes, above --max-page-bytes {}",
                    path.display(),
                    html.len(),
                    args.max_page_bytes
                )));
            }
            html
        }
        None => client::fetch_schedule_page(&schedule_request(&args)?).await?,
    };

    if args.debug {
        save_debug_files(&args.output_dir, &html)?;
    }

    let backend = if args.scanner { Backend::Scanner } else { Backend::Dom };
    let extractor = ScheduleExtractor::with_rules(rules);
    let timer = StageTimer::new();
    let instrument: &dyn Instrument = if args.timings { &timer } else { &NoopInstrument };

    let schedule = extractor.extract_with(&html, backend, instrument)?;
    tracing::info!(
        "Extracted week {} ({}) for {}: {} days, {} classes",
        schedule.week_number,
        schedule.year,
        schedule.student.name,
        schedule.days.len(),
        schedule.summary.total_classes
    );
    if args.timings {
        println!("{}", timer.summary());
    }

    let response = ScheduleResponse::new(schedule);
    println!("ETag: {}", response.etag());
    if let Some(tag) = &args.if_none_match {
        if response.is_not_modified(tag) {
            tracing::info!("Schedule unchanged ({}), nothing written", response.next_hash);
            return Ok(());
        }
    }

    let storage = StorageManager::new(&args.output_dir)?;
    if args.skip_unchanged && storage.is_unchanged(&response)? {
        tracing::info!("Saved week matches ({}), nothing written", response.next_hash);
        return Ok(());
    }
    let json_path = storage.save_schedule(&response)?;
    let report_path = storage.save_report(&response.schedule)?;
    tracing::info!("Wrote {} and {}", json_path.display(), report_path.display());

    Ok(())
}

fn load_rules(path: &Path) -> Result<ExtractionRules, AppError> {
    let json = std::fs::read_to_string(path)?;
    ExtractionRules::from_json(&json)
        .map_err(|e| AppError::Config(format!("Invalid rules file {}: {}", path.display(), e)))
}

fn schedule_request(args: &Args) -> Result<ScheduleRequest, AppError> {
    let gym_id = args
        .gym_id
        .clone()
        .ok_or_else(|| AppError::Config("--gym-id is required without --input".to_string()))?;
    let cookie = args
        .cookie
        .clone()
        .or_else(|| std::env::var("LECTIO_COOKIE").ok())
        .ok_or_else(|| AppError::Config("No cookie given (--cookie or LECTIO_COOKIE)".to_string()))?;
    let session = args.session.clone().or_else(|| std::env::var("LECTIO_SESSION").ok());

    Ok(ScheduleRequest {
        gym_id,
        week: args.week.clone(),
        cookie,
        session,
        max_page_bytes: args.max_page_bytes,
    })
}

fn save_debug_files(output_dir: &Path, html: &str) -> Result<(), AppError> {
    let debug_dir = output_dir.join("debug");
    std::fs::create_dir_all(&debug_dir)?;

    let raw_path = debug_dir.join("raw_schedule.html");
    std::fs::write(&raw_path, html)?;
    tracing::info!("Saved raw page to: {}", raw_path.display());

    let annotated_path = debug_dir.join("schedule_annotated.html");
    match utils::html_debug::create_debug_html(html, &annotated_path, utils::html_debug::SCHEDULE_MARKERS) {
        Ok(count) => tracing::info!("Created annotated debug HTML with {} highlights: {}", count, annotated_path.display()),
        Err(e) => tracing::warn!("Failed to create debug HTML: {}", e),
    }
    Ok(())
}

// Credentials stay out of the logs.
fn redacted(args: &Args) -> String {
    format!(
        "input={:?} gym_id={:?} week={:?} cookie={} session={} scanner={} output_dir={}",
        args.input,
        args.gym_id,
        args.week,
        if args.cookie.is_some() { "<set>" } else { "<unset>" },
        if args.session.is_some() { "<set>" } else { "<unset>" },
        args.scanner,
        args.output_dir.display()
    )
}
