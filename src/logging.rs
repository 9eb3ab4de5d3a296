use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

struct FileLogger {
    file: Mutex<Option<File>>,
    log_path: PathBuf,
}

impl FileLogger {
    fn new() -> Self {
        let log_path = get_log_path();
        // Truncate on startup so each run starts with a fresh log.
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_path)
            .ok();

        FileLogger {
            file: Mutex::new(file),
            log_path,
        }
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_line = format_line(record);

            if let Ok(mut guard) = self.file.lock() {
                if let Some(ref mut file) = *guard {
                    let _ = file.write_all(log_line.as_bytes());
                    let _ = file.flush();
                }
            }

            // Also print to stderr in dev mode
            #[cfg(debug_assertions)]
            eprint!("{}", log_line);
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

fn format_line(record: &Record) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!(
        "[{timestamp}] [{level:5}] [{target}] {message}\n",
        level = record.level(),
        target = record.target(),
        message = record.args()
    )
}

fn get_log_path() -> PathBuf {
    get_log_dir().join("debug.log")
}

fn get_log_dir() -> PathBuf {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vagrant-tray");
    let _ = std::fs::create_dir_all(&log_dir);
    log_dir
}

static LOGGER: std::sync::OnceLock<FileLogger> = std::sync::OnceLock::new();

/// Initialize logging.
///
/// Debug builds (or `VAGRANT_TRAY_DEBUG_LOG=1`) log to a file in the cache
/// directory. Otherwise `RUST_LOG` enables plain stderr logging, and without
/// it logging stays off.
pub fn init() -> Result<(), SetLoggerError> {
    if cfg!(debug_assertions) || env_flag_enabled("VAGRANT_TRAY_DEBUG_LOG") {
        let logger = LOGGER.get_or_init(FileLogger::new);
        log::set_logger(logger)?;
        log::set_max_level(LevelFilter::Debug);

        log::info!("=== Vagrant Tray Debug Log Started ===");
        log::info!("Log file: {:?}", logger.log_path);
        return Ok(());
    }

    if std::env::var_os("RUST_LOG").is_some() {
        return env_logger::Builder::from_default_env()
            .format_timestamp_millis()
            .try_init();
    }

    log::set_max_level(LevelFilter::Off);
    Ok(())
}

fn env_flag_enabled(key: &str) -> bool {
    std::env::var(key)
        .map(|value| {
            let trimmed = value.trim();
            !trimmed.is_empty() && trimmed != "0"
        })
        .unwrap_or(false)
}

/// Get the path to the log file
pub fn get_log_file_path() -> PathBuf {
    get_log_path()
}
