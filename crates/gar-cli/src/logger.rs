//! Stderr logger for the `log` facade.
//!
//! gar-core reports per-entry progress and worker failures through `log`;
//! this renders those records on stderr so stdout stays clean for results.

use console::Term;
use console::style;
use log::Level;
use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;

struct StderrLogger {
    level: LevelFilter,
    term: Term,
    use_colors: bool,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let tag = match record.level() {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        };
        let tag = if self.use_colors {
            match record.level() {
                Level::Error => style(tag).red().bold().to_string(),
                Level::Warn => style(tag).yellow().bold().to_string(),
                Level::Info => style(tag).green().to_string(),
                Level::Debug | Level::Trace => style(tag).dim().to_string(),
            }
        } else {
            tag.to_string()
        };

        let _ = self.term.write_line(&format!("{tag}: {}", record.args()));
    }

    fn flush(&self) {
        let _ = self.term.flush();
    }
}

/// Level implied by the global flags.
pub const fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    }
}

/// Installs the logger. A second call is a no-op.
pub fn init(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);
    let logger = StderrLogger {
        level,
        term: Term::stderr(),
        use_colors: console::colors_enabled_stderr(),
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(true, false), LevelFilter::Debug);
        assert_eq!(level_for(false, true), LevelFilter::Error);
        assert_eq!(level_for(false, false), LevelFilter::Warn);
    }
}
