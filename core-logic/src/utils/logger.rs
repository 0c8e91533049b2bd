use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Installs the global subscriber: an hourly-rolling file under `log_dir`
/// plus a colored console layer. The returned guard must be kept alive for
/// the file writer to flush.
pub fn setup_logger(log_dir: &str) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(log_dir).is_err() {
        eprintln!("Could not create log directory '{}', file logging disabled", log_dir);
        return None;
    }

    let file_appender = tracing_appender::rolling::hourly(log_dir, "arc-bot");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target("task_result", Level::INFO)
        .with_default(Level::INFO);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Retry warnings and proxy fallbacks are worth seeing live
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target("task_result", Level::INFO)
        .with_default(Level::WARN);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    if installed.is_err() {
        return None;
    }

    Some(guard)
}

// --- Formatters ---

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

fn event_message(event: &Event<'_>) -> String {
    let mut visitor = MessageVisitor {
        message: String::new(),
    };
    event.record(&mut visitor);
    visitor.message
}

fn paint_keywords(msg: String) -> String {
    let keywords = [
        ("CONFIRMED", Color::LightGreen),
        ("FAILED", Color::LightRed),
        ("SKIPPED", Color::Yellow),
    ];

    keywords.iter().fold(msg, |acc, (word, color)| {
        if acc.contains(word) {
            let painted = Style::new().fg(*color).bold().paint(*word).to_string();
            acc.replace(word, &painted)
        } else {
            acc
        }
    })
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%H:%M:%S");
        let prefix = match *event.metadata().level() {
            Level::ERROR => Color::Red.bold().paint("ERROR ").to_string(),
            Level::WARN => Color::Yellow.bold().paint("WARN  ").to_string(),
            _ => String::new(),
        };

        let msg = paint_keywords(event_message(event));
        writeln!(
            writer,
            "{} {}{}",
            Color::DarkGray.paint(timestamp.to_string()),
            prefix,
            msg
        )
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let metadata = event.metadata();

        writeln!(
            writer,
            "{} [{}] {}: {}",
            timestamp,
            metadata.level(),
            metadata.target(),
            event_message(event)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_keywords_leaves_plain_text() {
        assert_eq!(paint_keywords("nothing here".to_string()), "nothing here");
    }

    #[test]
    fn test_paint_keywords_wraps_status() {
        let painted = paint_keywords("[w1] CONFIRMED mint".to_string());
        assert!(painted.contains("CONFIRMED"));
        assert_ne!(painted, "[w1] CONFIRMED mint");
    }
}
