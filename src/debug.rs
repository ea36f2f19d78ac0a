//! Unified logging for par-revise.
//!
//! Routes all `log::info!()` etc. to a debug log file, keeping diagnostic
//! output away from stdout so the CLI's own output stays pipeable. When
//! `RUST_LOG` is set the bridge also mirrors to stderr for terminal
//! debugging.
//!
//! Level precedence: explicit CLI `--log-level` flag, then `RUST_LOG`,
//! then the config-file default passed by the caller.

use std::fs::OpenOptions;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;

/// Location of the debug log file.
pub fn log_path() -> std::path::PathBuf {
    #[cfg(unix)]
    return std::path::PathBuf::from("/tmp/par_revise_debug.log");
    #[cfg(not(unix))]
    return std::env::temp_dir().join("par_revise_debug.log");
}

struct LogBridge {
    file: Mutex<Option<std::fs::File>>,
    mirror_stderr: bool,
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr || record.level() == Level::Error {
            let _ = std::io::stderr().write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Seconds.millis since the Unix epoch; enough to order events in the log.
fn timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => format!("{}.{:03}", d.as_secs(), d.subsec_millis()),
        Err(_) => "0.000".to_string(),
    }
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Install the log bridge. Safe to call more than once; only the first
/// call installs a logger (later calls still adjust the max level).
///
/// `cli_level` is the `--log-level` flag; `fallback` is the config-file
/// default applied when neither the flag nor `RUST_LOG` decides.
pub fn init_log_bridge(cli_level: Option<&str>, fallback: &str) {
    let env_level = std::env::var("RUST_LOG").ok();
    let level = cli_level
        .and_then(parse_level)
        .or_else(|| env_level.as_deref().and_then(parse_level))
        .or_else(|| parse_level(fallback))
        .unwrap_or(LevelFilter::Warn);

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path())
        .ok();

    let bridge = LogBridge {
        file: Mutex::new(file),
        mirror_stderr: env_level.is_some(),
    };

    if log::set_boxed_logger(Box::new(bridge)).is_ok() {
        log::set_max_level(level);
        log::info!("par-revise debug session started (level={level})");
    } else {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_accepts_common_names() {
        assert_eq!(parse_level("info"), Some(LevelFilter::Info));
        assert_eq!(parse_level("WARN"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("warning"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("bogus"), None);
    }

    #[test]
    fn timestamp_is_seconds_dot_millis() {
        let ts = timestamp();
        let (secs, millis) = ts.split_once('.').expect("dot separator");
        assert!(secs.parse::<u64>().is_ok());
        assert_eq!(millis.len(), 3);
    }
}
