//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file with timestamps and ANSI codes stripped.
///
/// Always captures events at `DEBUG` level and above regardless of the
/// console verbosity setting.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command` under the cache directory.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::open(&log_file_path(command)?)
    }

    /// Truncate `path`, write a run header, and return a layer appending to it.
    pub(super) fn open(path: &Path) -> Option<Self> {
        let version = option_env!("NIRI_MCP_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "==========================================\n\
             niri-mcp {version} {}\n\
             ==========================================\n",
            format_utc_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let level = *event.metadata().level();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = strip_ansi(&extractor.message);
        let ts = format_utc_time();

        let line = match level {
            tracing::Level::ERROR => format!("[{ts}] [error] {msg}"),
            tracing::Level::WARN => format!("[{ts}] [warn] {msg}"),
            tracing::Level::INFO => format!("[{ts}] {msg}"),
            _ => format!("[{ts}] [debug] {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that prefixes each message
/// with a coloured level tag.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let level = *event.metadata().level();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        let ansi = writer.has_ansi_escapes();
        match level {
            tracing::Level::ERROR if ansi => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            tracing::Level::ERROR => writeln!(writer, "ERROR {msg}"),
            tracing::Level::WARN if ansi => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            tracing::Level::WARN => writeln!(writer, "WARN  {msg}"),
            tracing::Level::INFO => writeln!(writer, "{msg}"),
            _ if ansi => writeln!(writer, "\x1b[2m{msg}\x1b[0m"),
            _ => writeln!(writer, "{msg}"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stderr at `INFO` (or `DEBUG` when `verbose`); the
/// file layer writes every `DEBUG`+ event to
/// `$XDG_CACHE_HOME/niri-mcp/<command>.log`. Must be called once at program
/// startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use std::io::IsTerminal as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    fn with_file_layer(path: &Path, f: impl FnOnce()) {
        let layer = FileLayer::open(path).expect("open log file");
        let subscriber = tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG));
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn file_layer_writes_header_and_events() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("serve.log");

        with_file_layer(&path, || {
            tracing::info!("listening on stdio");
            tracing::warn!("niri not found");
            tracing::debug!("exec: niri msg --json outputs");
        });

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[1].starts_with("niri-mcp "));
        assert!(lines[3].ends_with("] listening on stdio"));
        assert!(lines[4].ends_with("] [warn] niri not found"));
        assert!(lines[5].ends_with("] [debug] exec: niri msg --json outputs"));
    }

    #[test]
    fn file_layer_strips_ansi() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("call.log");

        with_file_layer(&path, || {
            tracing::error!("\x1b[31mboom\x1b[0m");
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[error] boom"));
        assert!(!content.contains('\x1b'));
    }

    #[test]
    fn file_layer_truncates_previous_run() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("serve.log");
        fs::write(&path, "stale\n").unwrap();

        with_file_layer(&path, || tracing::info!("fresh"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.contains("fresh"));
    }

    #[test]
    fn file_layer_open_fails_for_missing_parent() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(FileLayer::open(&tmp.path().join("missing/serve.log")).is_none());
    }
}
