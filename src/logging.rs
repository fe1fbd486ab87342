use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PURSE_LOG";
const LOG_FILE: &str = "purse.log";

static TRACING_INIT: Once = Once::new();

/// Route tracing output to `<data_dir>/purse.log` so it never lands on top of
/// the terminal UI. Falls back to stderr when the file cannot be opened.
pub fn init_tracing(data_dir: &Path) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

        let file = std::fs::create_dir_all(data_dir).and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(data_dir.join(LOG_FILE))
        });
        let installed = match file {
            Ok(f) => builder.with_writer(Mutex::new(f)).try_init(),
            Err(_) => builder.with_writer(std::io::stderr).try_init(),
        };
        if installed.is_ok() {
            tracing::debug!(data_dir = %data_dir.display(), "tracing initialized");
        }
    });
}
