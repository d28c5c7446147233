//! Browser console logging.

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;

use log::Level;

/// Route `log` records to the browser console and report panics there.
///
/// Calling it again keeps the first logger.
pub fn init(level: Level) {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(level) {
        log::debug!("console logger already installed: {err}");
    }
}

/// Parse a level name such as `"debug"` or `"WARN"`.
#[must_use]
pub fn parse_level(name: &str) -> Option<Level> {
    let name = name.trim();
    Level::iter().find(|level| level.as_str().eq_ignore_ascii_case(name))
}
