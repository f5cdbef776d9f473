//! Logger setup for the viewer binary.
//!
//! The library only talks to the `log` facade. The rasterizer logs one
//! `debug!` line per draw call and a `trace!` line per skipped triangle,
//! which floods the terminal at 60 frames a second, so the default filter
//! keeps `swraster::rasterizer` at `warn` while the rest of the crate
//! reports at `info`.

use std::sync::Once;

use env_logger::WriteStyle;

/// Environment variable checked before `RUST_LOG`
pub const FILTER_ENV: &str = "SWRASTER_LOG";

/// Filter used when nothing else is given
pub const DEFAULT_FILTER: &str = "info,swraster::rasterizer=warn";

/// Logger configuration.
///
/// `filter` uses the `env_logger` syntax, e.g. `"swraster=debug"` to see
/// per-draw stats or `"swraster::rasterizer=trace"` for degenerate triangles.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    /// Prefix lines with a timestamp; off by default for an interactive viewer
    pub timestamps: bool,
    pub write_style: WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            timestamps: false,
            write_style: WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Filter to install: the explicit one, then `$SWRASTER_LOG`, then
    /// `$RUST_LOG`, then [`DEFAULT_FILTER`]. Empty values are skipped.
    pub fn resolve_filter(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        self.filter
            .clone()
            .into_iter()
            .chain(lookup(FILTER_ENV))
            .chain(lookup("RUST_LOG"))
            .find(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Only the first call has any effect, and an
/// already installed logger (a test harness, an embedding app) is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(|name| std::env::var(name).ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);
        if !config.timestamps {
            builder.format_timestamp(None);
        }

        if builder.try_init().is_ok() {
            log::debug!("logging initialized with filter '{}'", filter);
        }
    });
}
