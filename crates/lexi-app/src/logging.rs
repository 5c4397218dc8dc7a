use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Log files kept per tool, the new one included
pub const KEEP_LOGS: usize = 10;

// HTTP internals are noisy at debug
const FILE_FILTER: &str = "debug,hyper=info,hyper_util=info,reqwest=info,h2=info";

/// Console output filtered by `RUST_LOG` (or `--debug`), plus a full debug
/// log under `log_dir` named `{tool}_{timestamp}.log`
pub fn init(log_dir: &Path, tool: &str, debug: bool) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;

    let removed = cleanup_old_logs(log_dir, tool, KEEP_LOGS - 1)?;

    let path = log_dir.join(log_file_name(tool, chrono::Local::now()));
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

    let console_filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(console_filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(EnvFilter::new(FILE_FILTER)),
        )
        .try_init()?;

    if removed > 0 {
        tracing::debug!("Removed {} old log files", removed);
    }

    Ok(path)
}

pub fn log_file_name<Tz>(tool: &str, now: chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{tool}_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Delete all but the newest `keep` logs of `tool`; returns how many went
pub fn cleanup_old_logs(log_dir: &Path, tool: &str, keep: usize) -> io::Result<usize> {
    let prefix = format!("{tool}_");

    let mut logs: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| is_tool_log(name, &prefix))
        })
        .collect();

    if logs.len() <= keep {
        return Ok(0);
    }

    // Timestamped names sort oldest first
    logs.sort();
    let excess = logs.len() - keep;
    for path in &logs[..excess] {
        fs::remove_file(path)?;
    }

    Ok(excess)
}

/// `{tool}_{YYYYmmdd}_{HHMMSS}.log`, so `generate` never matches `generate_vietnamese`
fn is_tool_log(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".log"))
        .is_some_and(|stamp| {
            stamp.len() == 15
                && stamp
                    .chars()
                    .enumerate()
                    .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(log_file_name("enrich", at), "enrich_20240309_070501.log");
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = std::env::temp_dir().join(format!("lexi-logs-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        for day in 1..=12 {
            fs::write(dir.join(format!("enrich_202401{day:02}_120000.log")), "").unwrap();
        }
        fs::write(dir.join("enrich_notes.txt"), "").unwrap();
        fs::write(dir.join("compare_20240101_120000.log"), "").unwrap();

        let removed = cleanup_old_logs(&dir, "enrich", 9).unwrap();
        assert_eq!(removed, 3);
        assert!(!dir.join("enrich_20240103_120000.log").exists());
        assert!(dir.join("enrich_20240104_120000.log").exists());
        assert!(dir.join("enrich_notes.txt").exists());
        assert!(dir.join("compare_20240101_120000.log").exists());

        assert_eq!(cleanup_old_logs(&dir, "enrich", 9).unwrap(), 0);
    }
}
