use std::backtrace::Backtrace;
use std::env;
use std::panic::PanicHookInfo;

use tracing::Event;
use tracing::Subscriber;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::fmt::FormattedFields;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

/// Install the global subscriber.
///
/// Logs go to an hourly rotated file in `dir` if it is given, or to stderr.
/// The returned guard flushes buffered logs when dropped.
pub fn init_logging(
    app_name: &str,
    dir: Option<&str>,
    level: &str,
) -> anyhow::Result<WorkerGuard> {
    set_panic_hook();

    let (writer, g) = match dir {
        Some(dir) => {
            let f = RollingFileAppender::new(Rotation::HOURLY, dir, app_name);
            tracing_appender::non_blocking(f)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let sub = build_subscriber(writer, level, dir.is_none());
    tracing::subscriber::set_global_default(sub)?;

    tracing::info!(
        "initialized global tracing: in {}/{} at {}",
        dir.unwrap_or("<stderr>"),
        app_name,
        level
    );
    Ok(g)
}

pub fn set_panic_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        log_panic(panic);
        prev_hook(panic);
    }));
}

pub fn log_panic(panic: &PanicHookInfo) {
    let backtrace = { format!("{:?}", Backtrace::force_capture()) };

    if let Some(location) = panic.location() {
        tracing::error!(
            message = %panic.to_string().replace('\n', " "),
            backtrace = %backtrace,
            panic.file = location.file(),
            panic.line = location.line(),
            panic.column = location.column(),
        );
    } else {
        tracing::error!(message = %panic.to_string().replace('\n', " "), backtrace = %backtrace);
    }
}

fn build_subscriber(
    writer: NonBlocking,
    level: &str,
    ansi: bool,
) -> impl Subscriber {
    let f_layer = fmt::Layer::new()
        .with_span_events(fmt::format::FmtSpan::NONE)
        .with_writer(writer)
        .with_ansi(ansi)
        .event_format(EventFormatter {});

    // Use env RUST_LOG to initialize log if present.
    // Otherwise, use the specified level.
    let directives =
        env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_x| level.to_string());
    let env_filter = EnvFilter::new(directives);

    Registry::default().with(env_filter).with(f_layer)
}

/// Formats an event as `<time> <level> <span>{<fields>}:... <message>`.
///
/// The `Core{id=node-1}` span tells which node logged the event.
pub struct EventFormatter {}

impl<S, N> FormatEvent<S, N> for EventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        SystemTime {}.format_time(&mut writer)?;
        writer.write_char(' ')?;

        let fmt_level = meta.level().as_str();
        write!(writer, "{:>5} ", fmt_level)?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let ext = span.extensions();
                let fields = ext.get::<FormattedFields<N>>();

                match fields {
                    Some(f) if !f.is_empty() => {
                        write!(writer, "{}{{{}}}:", span.name(), f)?
                    }
                    _ => write!(writer, "{}:", span.name())?,
                }
            }
            writer.write_char(' ')?;
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
