//! Console log formatting for mesh tools.
//!
//! Lines look like `[timestamp] [component] [level] message`, with the
//! component taken from a `component` field when the event carries one.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_CYAN: &str = "\x1b[36m";
const COLOR_GREEN: &str = "\x1b[32m";
const COLOR_BRIGHT_YELLOW: &str = "\x1b[93m";
const COLOR_BRIGHT_RED: &str = "\x1b[91m";
const COLOR_BRIGHT_GRAY: &str = "\x1b[90m";

const COMPONENT_WIDTH: usize = 20;
const LOG_LEVEL_WIDTH: usize = 7;

/// Crates whose events follow the requested level
const MESH_TARGETS: [&str; 4] = ["bt_mesh", "mesh_crypto", "mesh_wire", "mesh_access"];

/// Log an info event tagged with a component
#[macro_export]
macro_rules! component_info {
    ($component:expr, $($arg:tt)*) => {
        tracing::info!(component = $component, $($arg)*)
    };
}

/// Log a warning tagged with a component
#[macro_export]
macro_rules! component_warn {
    ($component:expr, $($arg:tt)*) => {
        tracing::warn!(component = $component, $($arg)*)
    };
}

/// Log a debug event tagged with a component
#[macro_export]
macro_rules! component_debug {
    ($component:expr, $($arg:tt)*) => {
        tracing::debug!(component = $component, $($arg)*)
    };
}

/// Log an error tagged with a component
#[macro_export]
macro_rules! component_error {
    ($component:expr, $($arg:tt)*) => {
        tracing::error!(component = $component, $($arg)*)
    };
}

/// Event formatter with fixed width component and level columns
pub struct MeshLogFormatter {
    service_name: String,
    color_enabled: bool,
}

impl MeshLogFormatter {
    /// Formatter for `service_name`, coloured when stdout looks like a terminal
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            color_enabled: is_terminal(),
        }
    }

    /// Force colours on or off
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color_enabled = enabled;
        self
    }

    fn format_component(&self, component: Option<&str>) -> String {
        let name = match component {
            Some(comp) => format!("{}-{}", self.service_name, comp),
            None => self.service_name.clone(),
        };

        if name.chars().count() > COMPONENT_WIDTH {
            let truncated: String = name.chars().take(COMPONENT_WIDTH - 1).collect();
            format!("{truncated}…")
        } else {
            format!("{:<width$}", name, width = COMPONENT_WIDTH)
        }
    }

    fn format_log_level(&self, level: &Level) -> String {
        let level_str = match *level {
            Level::ERROR => "✗ ERROR",
            Level::WARN => "⚠ WARN",
            Level::INFO => "ℹ INFO",
            Level::DEBUG => "◦ DEBUG",
            Level::TRACE => "◦ TRACE",
        };

        // icon plus space
        format!("{:<width$}", level_str, width = LOG_LEVEL_WIDTH + 2)
    }

    fn color_for_level(&self, level: &Level) -> &'static str {
        if !self.color_enabled {
            return "";
        }

        match *level {
            Level::ERROR => COLOR_BRIGHT_RED,
            Level::WARN => COLOR_BRIGHT_YELLOW,
            Level::INFO => COLOR_GREEN,
            Level::DEBUG | Level::TRACE => COLOR_BRIGHT_GRAY,
        }
    }

    fn write_line(
        &self,
        writer: &mut impl fmt::Write,
        timestamp: &str,
        level: &Level,
        visitor: &FieldVisitor,
    ) -> fmt::Result {
        let color = self.color_for_level(level);
        let reset_color = if self.color_enabled { COLOR_RESET } else { "" };
        let cyan_color = if self.color_enabled { COLOR_CYAN } else { "" };

        write!(
            writer,
            "{}[{}] [{}] [{}{}{}] {}",
            cyan_color,
            timestamp,
            self.format_component(visitor.component.as_deref()),
            color,
            self.format_log_level(level),
            reset_color,
            visitor.message
        )?;
        for (name, value) in &visitor.fields {
            write!(writer, " {name}={value}")?;
        }
        writeln!(writer, "{reset_color}")
    }
}

impl<S, N> FormatEvent<S, N> for MeshLogFormatter
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
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.write_line(&mut writer, &timestamp, event.metadata().level(), &visitor)
    }
}

/// Collects the message, the component and any structured fields
#[derive(Default)]
struct FieldVisitor {
    message: String,
    component: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        let value = format!("{value:?}");
        let value = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            Some(unquoted) => unquoted.to_string(),
            None => value,
        };
        self.record_value(field.name(), value);
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.record_value(field.name(), value.to_string());
    }
}

impl FieldVisitor {
    fn record_value(&mut self, name: &'static str, value: String) {
        match name {
            "message" => self.message = value,
            "component" => self.component = Some(value),
            _ => self.fields.push((name, value)),
        }
    }
}

/// Filter passing `level` for the mesh crates and `info` for everything else
pub fn env_filter(level: &str) -> Result<EnvFilter, ParseError> {
    let mut filter = EnvFilter::new("info");
    for target in MESH_TARGETS {
        filter = filter.add_directive(format!("{target}={level}").parse()?);
    }
    Ok(filter)
}

/// Install the mesh formatter as the global subscriber.
///
/// Fails if `level` is not a valid level or a subscriber is already set.
pub fn init_logging(service_name: &str, level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level)?)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(true)
        .event_format(MeshLogFormatter::new(service_name))
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install subscriber: {err}"))
}

/// Colour only when a terminal is attached
fn is_terminal() -> bool {
    match std::env::var("TERM") {
        Ok(term) => term != "dumb",
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(message: &str, component: Option<&str>) -> FieldVisitor {
        FieldVisitor {
            message: message.to_string(),
            component: component.map(str::to_string),
            fields: Vec::new(),
        }
    }

    #[test]
    fn test_component_column() {
        let formatter = MeshLogFormatter::new("mesh").with_color(false);
        assert_eq!(formatter.format_component(None), format!("{:<20}", "mesh"));
        assert_eq!(formatter.format_component(Some("keyring")), format!("{:<20}", "mesh-keyring"));

        let long = formatter.format_component(Some("a-very-long-component"));
        assert_eq!(long.chars().count(), COMPONENT_WIDTH);
        assert!(long.ends_with('…'));
    }

    #[test]
    fn test_level_column() {
        let formatter = MeshLogFormatter::new("mesh").with_color(false);
        assert_eq!(formatter.format_log_level(&Level::WARN), "⚠ WARN   ");
        assert_eq!(formatter.format_log_level(&Level::ERROR), "✗ ERROR  ");
    }

    #[test]
    fn test_plain_line() {
        let formatter = MeshLogFormatter::new("mesh").with_color(false);
        let mut line = String::new();
        let mut fields = visitor("keyring loaded", Some("keyring"));
        fields.fields.push(("net_keys", "2".to_string()));
        formatter
            .write_line(&mut line, "2024-01-01 00:00:00.000", &Level::INFO, &fields)
            .unwrap();
        assert_eq!(
            line,
            format!(
                "[2024-01-01 00:00:00.000] [{:<20}] [{:<9}] keyring loaded net_keys=2\n",
                "mesh-keyring", "ℹ INFO"
            )
        );
    }

    #[test]
    fn test_coloured_line() {
        let formatter = MeshLogFormatter::new("mesh").with_color(true);
        let mut line = String::new();
        formatter
            .write_line(&mut line, "ts", &Level::ERROR, &visitor("boom", None))
            .unwrap();
        assert!(line.starts_with(COLOR_CYAN));
        assert!(line.contains(COLOR_BRIGHT_RED));
        assert!(line.ends_with(&format!("boom{COLOR_RESET}\n")));
    }

    #[test]
    fn test_env_filter() {
        assert!(env_filter("debug").is_ok());
        assert!(env_filter("trace").is_ok());
        assert!(env_filter("not a level!").is_err());
    }
}
