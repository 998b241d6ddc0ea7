use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{filter::FilterFn, layer::SubscriberExt, util::SubscriberInitExt, Layer};

const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

/// Pick the log level: explicit value first, then `LOG_LEVEL`, then WARN.
pub fn level_from(explicit: Option<&str>) -> LevelFilter {
    let Some(level) = explicit
        .map(str::to_string)
        .or_else(|| std::env::var("LOG_LEVEL").ok())
    else {
        return DEFAULT_LEVEL;
    };

    LevelFilter::from_str(&level).unwrap_or_else(|_| {
        eprintln!("Invalid log level specified {level}, defaulting to {DEFAULT_LEVEL}");
        DEFAULT_LEVEL
    })
}

/// Install a compact stderr subscriber showing only this crate's events.
pub fn init(explicit: Option<&str>) {
    let level = level_from(explicit);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| metadata.target().starts_with("spf_check"))),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_is_used() {
        assert_eq!(level_from(Some("debug")), LevelFilter::DEBUG);
        assert_eq!(level_from(Some("TRACE")), LevelFilter::TRACE);
    }

    #[test]
    fn invalid_level_falls_back() {
        assert_eq!(level_from(Some("chatty")), DEFAULT_LEVEL);
    }
}
