use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    EnvFilter,
};

/// Plain status lines: `[info] ...`, `[!] ...`, or `[<object>] ...` when the
/// event names a protocol object as its target. No timestamps.
pub struct StatusLines;

impl<S, N> FormatEvent<S, N> for StatusLines
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut message = String::new();
        ctx.field_format().format_fields(Writer::new(&mut message), event)?;
        writeln!(writer, "{}", line(&prefix(meta.target(), meta.level()), &message))
    }
}

// A message that opens with its own tag (`[+]`, `[-]`) is glued to the prefix.
fn line(prefix: &str, message: &str) -> String {
    if message.starts_with('[') {
        format!("{}{}", prefix, message)
    } else {
        format!("{} {}", prefix, message)
    }
}

fn prefix(target: &str, level: &Level) -> String {
    match *level {
        Level::ERROR | Level::WARN => "[!]".to_string(),
        _ if is_object_target(target) => format!("[{}]", target),
        Level::INFO => "[info]".to_string(),
        Level::DEBUG => "[debug]".to_string(),
        _ => "[trace]".to_string(),
    }
}

// Module paths (and the crate root) are the default targets; anything else was
// set explicitly with `target: "..."`.
fn is_object_target(target: &str) -> bool {
    !target.contains("::") && target != env!("CARGO_CRATE_NAME")
}

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(StatusLines)
        .init();
}
