//! Log output for the `lexispark` binary
//!
//! Library code only talks to the `log` facade; this module installs the
//! terminal logger. `RUST_LOG` overrides the default filter.

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, SetLoggerError};
use pretty_env_logger::env_logger;

static OUTPUT_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Install the logger with `default_filter` (e.g. `"info"`)
pub fn init(default_filter: &str) -> Result<(), SetLoggerError> {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.parse_filters(default_filter);
    builder.parse_default_env();

    builder.format(|buf, record| {
        if OUTPUT_SUPPRESSED.load(Ordering::Acquire) {
            return Ok(());
        }

        let mut level_style = buf.style();
        level_style.set_color(match record.level() {
            Level::Error => env_logger::fmt::Color::Red,
            Level::Warn => env_logger::fmt::Color::Yellow,
            Level::Info => env_logger::fmt::Color::Green,
            Level::Debug => env_logger::fmt::Color::Blue,
            Level::Trace => env_logger::fmt::Color::Magenta,
        });
        level_style.set_bold(true);

        writeln!(
            buf,
            "{} {} {} > {}",
            buf.timestamp(),
            level_style.value(format!("{:<5}", record.level())),
            record.target(),
            record.args()
        )
    });

    builder.try_init()
}

/// Silence log lines while an interactive prompt owns the terminal
pub fn suppress_output() -> SuppressionGuard {
    let previous = OUTPUT_SUPPRESSED.swap(true, Ordering::SeqCst);
    SuppressionGuard { previous }
}

/// Restores the previous suppression state on drop
pub struct SuppressionGuard {
    previous: bool,
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        OUTPUT_SUPPRESSED.store(self.previous, Ordering::SeqCst);
    }
}
