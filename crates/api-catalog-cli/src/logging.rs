use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "API_CATALOG_LOG";

/// Value of `--log-level`. `None` defers to `API_CATALOG_LOG`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[default]
    None,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::None,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    fn name(self) -> &'static str {
        match self {
            LogLevel::None => "none",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Most verbose level let through, `None` for no explicit level.
    fn max_level(self) -> Option<LevelFilter> {
        match self {
            LogLevel::None => None,
            LogLevel::Debug => Some(LevelFilter::DEBUG),
            LogLevel::Info => Some(LevelFilter::INFO),
            LogLevel::Warn => Some(LevelFilter::WARN),
            LogLevel::Error => Some(LevelFilter::ERROR),
        }
    }
}

impl core::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.name() == s)
            .ok_or_else(|| format!("unknown log level '{s}', expected none|debug|info|warn|error"))
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// An explicit `--log-level` wins over `API_CATALOG_LOG`; with neither,
/// logging stays off.
fn filter(level: LogLevel) -> Option<EnvFilter> {
    match level.max_level() {
        Some(max) => Some(EnvFilter::default().add_directive(max.into())),
        None => EnvFilter::try_from_env(LOG_ENV).ok(),
    }
}

/// Install the stderr tree subscriber if logging was asked for.
pub fn init(level: LogLevel) {
    let Some(filter) = filter(level) else {
        return;
    };
    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_verbose_exit(true)
                .with_verbose_entry(true)
                .with_timer(tracing_tree::time::Uptime::default())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_level() {
        for (raw, level) in [
            ("none", LogLevel::None),
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
        ] {
            assert_eq!(raw.parse::<LogLevel>(), Ok(level));
            assert_eq!(level.to_string(), raw);
        }
    }

    #[test]
    fn rejects_unknown_level() {
        assert!("trace".parse::<LogLevel>().is_err());
    }

    #[test]
    fn explicit_level_builds_filter() {
        assert_eq!(LogLevel::Warn.max_level(), Some(LevelFilter::WARN));
        assert!(filter(LogLevel::Warn).is_some());
    }
}
