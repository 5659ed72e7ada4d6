//! Diagnostics output
//!
//! `tracing` carries the regular log lines. The `--logging` switch adds a
//! JSON-lines event log of every CLI action, one `{ts_ms, event, data}`
//! object per line.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub const EVENT_LOG_PATH: &str = "/var/log/lannerpsp/events.json";
const FALLBACK_EVENT_LOG_PATH: &str = "/tmp/lannerpsp_events.json";
pub const LOG_ENV: &str = "LANNERPSP_LOG";

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Install the stderr subscriber; level from `LANNERPSP_LOG`, `warn` when unset
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // a second install (tests, embedding apps) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Start the event log, falling back to `/tmp` when `/var/log` is not writable
pub fn init_logging() {
    init_logging_at(Path::new(EVENT_LOG_PATH));
}

pub fn init_logging_at(path: &Path) {
    let file = open_append(path).or_else(|| {
        tracing::warn!("cannot open {}, using {}", path.display(), FALLBACK_EVENT_LOG_PATH);
        open_append(Path::new(FALLBACK_EVENT_LOG_PATH))
    });
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = file;
    }
}

/// Append one event; a no-op until [`init_logging`] ran
pub fn log_event(event: &str, data: Value) {
    let line = json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string();

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(f) = guard.as_mut() {
            let _ = writeln!(f, "{}", line);
        }
    }
}
