use error_stack::{Report, ResultExt};
use log::LevelFilter;

use crate::error::AdapterError;

/// Initialize logging for the host application.
///
/// Installs a global `fern` dispatcher writing timestamped lines to stderr.
/// Hosts that already own a logger should skip this and let the `log` facade
/// route into theirs.
///
/// # Errors
///
/// Returns [`AdapterError::Configuration`] if a global logger is already set.
pub fn init_logging(level: LevelFilter) -> Result<(), Report<AdapterError>> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}  {} [{}] {}",
                chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .change_context(AdapterError::Configuration {
            message: "Failed to initialize logger".to_string(),
        })
}

/// Level used when the Pangle debug log flag is set.
#[must_use]
pub fn level_for(debug_log: bool) -> LevelFilter {
    if debug_log {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
