//! provides logging helpers

use std::fmt::{self};
use std::path::Path;

use tracing::field::Field;
use tracing::field::Visit;
use tracing::Event;
use tracing::Subscriber;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::FilterExt;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

/// Target of the events carrying encoded metric lines.
pub const METRICS_TARGET: &str = "metrics";

/// Writes the `msg` field of metric events verbatim, one line per event.
struct MetricsLineFormatter;

#[derive(Default)]
struct MessageVisitor {
    msg: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "msg" {
            self.msg = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "msg" {
            self.msg = Some(format!("{value:?}"));
        }
    }
}

impl<S, N> FormatEvent<S, N> for MetricsLineFormatter
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        match visitor.msg {
            Some(line) => writeln!(writer, "{line}"),
            None => Ok(()),
        }
    }
}

/// initiate the global tracing subscriber
///
/// Regular logs go to stderr; metric lines go to a daily-rotated file.
pub fn init<P: AsRef<Path>>(metrics_file: P) -> tracing_appender::non_blocking::WorkerGuard {
    let metrics_file = metrics_file.as_ref();
    let path = metrics_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_prefix = metrics_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("node-metrics.log");

    let fmt_layer = utils::logging::get_fmt_layer().with_filter(
        utils::logging::default_env_filter().and(filter::filter_fn(|metadata| {
            metadata.target() != METRICS_TARGET
        })),
    );

    let (file_writer, file_guard) = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_prefix)
        .max_log_files(3)
        .build(path)
    {
        Ok(appender) => tracing_appender::non_blocking(appender),
        Err(e) => {
            eprintln!(
                "failed to create metrics file appender in {}: {e}, writing metrics to stdout",
                path.display()
            );
            tracing_appender::non_blocking(std::io::stdout())
        }
    };

    let metrics_layer = layer()
        .event_format(MetricsLineFormatter)
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|metadata| {
            metadata.target() == METRICS_TARGET
        }));

    registry().with(fmt_layer).with(metrics_layer).init();
    file_guard
}
