//! Log output for this library, composed into the binary's subscriber.

use std::io::{self, IsTerminal};

use tracing_subscriber::{
    Layer, filter,
    fmt::{self, format::Writer, time::FormatTime},
    registry::LookupSpan,
};

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// `2025-09-12T10:20:30Z`.
#[derive(Clone, Debug, Default)]
struct UtcSeconds;

impl FormatTime for UtcSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        w.write_str(&chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Compact formatter for this crate's events only, with `file:line` and span
/// close timings. Colors only on a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(UtcSeconds)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(filter::filter_fn(|meta| is_library_target(meta.target())))
}

/// `true` for events [`layer`] prints.
pub fn is_library_target(target: &str) -> bool {
    target.starts_with(TARGET_PREFIX)
}
