//! Command-line front end for the Listen Mode timing core.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load configuration from `conf/config.toml`.
//! - Build the sentence timeline for one page and print it as JSON, along with
//!   the highlighted sentence at each requested playback time.

use anyhow::{Context, Result, anyhow};
use dynasty_listen::cache::ListenPosition;
use dynasty_listen::config::{ListenConfig, load_config};
use dynasty_listen::matcher::HighlightUpdate;
use dynasty_listen::session::{
    ListenCommand, ListenSession, ListenSnapshot, persist_session_housekeeping,
};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str = "Usage: dynasty-listen <page.(html|txt)> <duration-secs> [--at <secs>]... [--book <id>] [--page <idx>] [--entitled] [--config <path>]";

#[derive(Debug)]
struct CliArgs {
    page_path: PathBuf,
    duration: f64,
    probe_times: Vec<f64>,
    book_id: Option<String>,
    page: Option<usize>,
    entitled: bool,
    config_path: PathBuf,
}

#[derive(Serialize)]
struct Probe {
    current_time: f64,
    update: HighlightUpdate,
    highlighted_sentence_idx: Option<usize>,
    audio_gate_reached: bool,
}

#[derive(Serialize)]
struct Report {
    snapshot: ListenSnapshot,
    probes: Vec<Probe>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.page_path.display(),
        duration = args.duration,
        level = %config.log_level,
        "Starting listen timeline"
    );

    let html = read_page(&args.page_path)?;
    let mut session = open_session(&args, &config);
    let started = Instant::now();
    let page = target_page(args.page, session.resume_position());
    for command in [
        ListenCommand::SetEntitled {
            entitled: args.entitled,
        },
        ListenCommand::SetPage { page, html },
        ListenCommand::SetDuration {
            secs: args.duration,
        },
    ] {
        session.apply_command(command, started);
    }
    let snapshot = session.snapshot();

    // Space probes one throttle interval apart so none of them is dropped.
    let interval = config.highlight_update_interval();
    let mut probes = Vec::with_capacity(args.probe_times.len());
    for (step, current_time) in args.probe_times.iter().copied().enumerate() {
        let now = started + interval * step as u32;
        let event = session.apply_command(ListenCommand::TimeUpdate { current_time }, now);
        probes.push(Probe {
            current_time,
            update: event.update,
            highlighted_sentence_idx: event.snapshot.highlighted_sentence_idx,
            audio_gate_reached: event.snapshot.audio_gate_reached,
        });
    }

    if args.book_id.is_some() {
        persist_session_housekeeping(&session);
    }

    let report = Report { snapshot, probes };
    let json = serde_json::to_string_pretty(&report).context("Serializing timeline report")?;
    println!("{json}");
    Ok(())
}

fn open_session(args: &CliArgs, config: &ListenConfig) -> ListenSession {
    match &args.book_id {
        Some(book_id) => ListenSession::load(book_id.clone(), config),
        None => ListenSession::new("cli", config),
    }
}

/// An explicit `--page` wins; otherwise continue from the cached position.
fn target_page(requested: Option<usize>, resume: Option<ListenPosition>) -> usize {
    requested
        .or(resume.map(|position| position.page))
        .unwrap_or(0)
}

fn read_page(path: &Path) -> Result<String> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if is_markup(path) {
        Ok(data)
    } else {
        Ok(escape_text(&data))
    }
}

fn is_markup(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase()),
        Some(ext) if ext == "html" || ext == "htm" || ext == "xhtml"
    )
}

/// Plain text is handed to the markup stripper too; keep it literal.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut probe_times = Vec::new();
    let mut book_id = None;
    let mut page = None;
    let mut entitled = false;
    let mut config_path = PathBuf::from("conf/config.toml");

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--at" => {
                let value = args.next().ok_or_else(|| anyhow!("--at needs a time"))?;
                probe_times.push(parse_seconds(&value)?);
            }
            "--book" => {
                book_id = Some(args.next().ok_or_else(|| anyhow!("--book needs an id"))?);
            }
            "--page" => {
                let value = args.next().ok_or_else(|| anyhow!("--page needs an index"))?;
                page = Some(
                    value
                        .parse::<usize>()
                        .with_context(|| format!("Invalid page index {value:?}"))?,
                );
            }
            "--config" => {
                let value = args.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                config_path = PathBuf::from(value);
            }
            "--entitled" => entitled = true,
            "-h" | "--help" => return Err(anyhow!(USAGE)),
            other if other.starts_with("--") => {
                return Err(anyhow!("Unknown option {other}\n{USAGE}"));
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let page_path = PathBuf::from(positional.next().ok_or_else(|| anyhow!(USAGE))?);
    let duration = parse_seconds(&positional.next().ok_or_else(|| anyhow!(USAGE))?)?;
    if let Some(extra) = positional.next() {
        return Err(anyhow!("Unexpected argument {extra}\n{USAGE}"));
    }
    if !page_path.exists() {
        return Err(anyhow!("File not found: {}", page_path.display()));
    }

    Ok(CliArgs {
        page_path,
        duration,
        probe_times,
        book_id,
        page,
        entitled,
        config_path,
    })
}

fn parse_seconds(value: &str) -> Result<f64> {
    let secs: f64 = value
        .parse()
        .with_context(|| format!("Invalid seconds value {value:?}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(anyhow!("Seconds must be a non-negative number, got {value}"));
    }
    Ok(secs)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_positionals() {
        let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let parsed = parse_args(args(&[
            manifest, "12.5", "--at", "3", "--at", "9.25", "--book", "b1", "--entitled",
        ]))
        .expect("arguments should parse");
        assert_eq!(parsed.duration, 12.5);
        assert_eq!(parsed.probe_times, vec![3.0, 9.25]);
        assert_eq!(parsed.book_id.as_deref(), Some("b1"));
        assert!(parsed.entitled);
        assert_eq!(parsed.page, None);
        assert_eq!(parsed.config_path, PathBuf::from("conf/config.toml"));
    }

    #[test]
    fn rejects_negative_duration_and_missing_file() {
        let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        assert!(parse_args(args(&[manifest, "-3"])).is_err());
        assert!(parse_args(args(&["/no/such/page.html", "3"])).is_err());
        assert!(parse_args(args(&[manifest])).is_err());
    }

    #[test]
    fn plain_text_is_escaped_before_stripping() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert!(is_markup(Path::new("page.HTML")));
        assert!(!is_markup(Path::new("page.txt")));
    }

    #[test]
    fn parses_page_index() {
        let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let parsed =
            parse_args(args(&[manifest, "4", "--page", "3"])).expect("arguments should parse");
        assert_eq!(parsed.page, Some(3));
        assert!(parse_args(args(&[manifest, "4", "--page", "-1"])).is_err());
        assert!(parse_args(args(&[manifest, "4", "--page"])).is_err());
    }

    #[test]
    fn page_falls_back_to_cached_position() {
        let cached = ListenPosition {
            page: 5,
            current_time: 12.0,
        };
        assert_eq!(target_page(Some(2), Some(cached)), 2);
        assert_eq!(target_page(None, Some(cached)), 5);
        assert_eq!(target_page(None, None), 0);
    }
}
