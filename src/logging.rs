//! Tracing setup shared by both binaries.
//!
//! Human-readable records go to stderr so stdout stays reserved for the
//! report. Setting `LOG_FILE_PATH` adds a JSON layer on a daily rolling file.

use anyhow::Result;
use std::ffi::OsStr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber.
///
/// The returned guard flushes the JSON file writer on drop, so keep it alive
/// for the whole run.
pub fn init(default_level: &str) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", default_level.parse()?));

    let (json_layer, guard) = match std::env::var("LOG_FILE_PATH") {
        Ok(log_file_path) if !log_file_path.trim().is_empty() => {
            let path = Path::new(&log_file_path);
            let log_dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let log_file_name = path
                .file_name()
                .unwrap_or(OsStr::new("erate_analyzer.log"));

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(env_filter("RUST_LOG_JSON", "debug".parse()?));
            (Some(layer), Some(file_guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()?;

    Ok(guard)
}

/// Filter read from `var`, falling back to `default` only when the variable
/// is unset or empty.
fn env_filter(var: &str, default: Directive) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default)
        .with_env_var(var)
        .from_env_lossy()
}
