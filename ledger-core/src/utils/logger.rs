//! Tracing setup: colorized console output plus a rolling log file.

use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    EnvFilter, Layer,
};

/// Installs the global subscriber. The returned guard must stay alive for
/// file logging to flush.
pub fn setup_logger() -> Option<WorkerGuard> {
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::daily("logs", "harness");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(ConsoleFormatter)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .ok()?;

    Some(guard)
}

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        let msg = visitor.message;

        let colored = if msg.contains("SUCCESS") {
            let green = Style::new().fg(Color::LightGreen).bold();
            msg.replace("SUCCESS", &format!("{}", green.paint("SUCCESS")))
        } else if msg.contains("FAILED") {
            let red = Style::new().fg(Color::LightRed).bold();
            msg.replace("FAILED", &format!("{}", red.paint("FAILED")))
        } else {
            msg
        };

        writeln!(writer, "{}", colored)
    }
}

struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(writer, "{} [{}] ", timestamp, event.metadata().level())?;

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        writeln!(writer, "{}", visitor.message)
    }
}
