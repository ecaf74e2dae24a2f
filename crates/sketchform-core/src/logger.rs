//! Stderr logger tagged by pipeline stage, and an optional tracing subscriber.
//!
//! Lines look like `[  0.123s  WARN change] background resized`: elapsed time
//! since installation, level, and the stage the record came from (see
//! [`stage_of`]). Call `init_with_level` once at startup; later calls are
//! no-ops.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt as tfmt, EnvFilter};

/// Module path suffix to stage tag. First match on the last path segment wins.
const STAGES: &[(&str, &str)] = &[
    ("change", "change"),
    ("mask", "change"),
    ("contour", "contour"),
    ("approx", "polygon"),
    ("detector", "shape"),
    ("shape", "shape"),
    ("normalize", "normalize"),
    ("generate", "formation"),
    ("assign", "assign"),
    ("dispatch", "dispatch"),
    ("flight_area", "waypoints"),
    ("viewpoint", "viewpoint"),
    ("detect", "pipeline"),
    ("session", "session"),
    ("config", "config"),
];

/// Pipeline stage for a `log` target such as `sketchform_vision::approx`.
///
/// The bare `sketchform` target is the CLI. Targets outside the pipeline
/// keep their first path segment.
pub fn stage_of(target: &str) -> &str {
    if target == "sketchform" {
        return "cli";
    }
    let last = target.rsplit("::").next().unwrap_or(target);
    STAGES
        .iter()
        .find(|(module, _)| *module == last)
        .map(|(_, stage)| *stage)
        .unwrap_or_else(|| target.split("::").next().unwrap_or(target))
}

struct Line<'a> {
    elapsed: f64,
    level: log::Level,
    stage: &'a str,
    message: &'a fmt::Arguments<'a>,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:7.3}s {:>5} {}] {}",
            self.elapsed, self.level, self.stage, self.message
        )
    }
}

struct StageLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Line {
            elapsed: self.started.elapsed().as_secs_f64(),
            level: record.level(),
            stage: stage_of(record.target()),
            message: record.args(),
        };
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StageLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tfmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tfmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
