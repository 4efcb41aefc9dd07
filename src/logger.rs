use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing_subscriber::EnvFilter;

/// Log levels representing increasing verbosity.
///
/// Setting a level enables that level and all less verbose levels below it:
///
/// - **Silent (0)**: No logging output
/// - **Error (1)**: Only error messages
/// - **Warn (2)**: Warning and error messages
/// - **Info (3)**: Informational, warning, and error messages (default)
/// - **Debug (4)**: All messages
///
/// The level is read from the `LOG_LEVEL` environment variable and can be changed at
/// runtime with `set_log_level()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    /// Parse a log level from a string (case insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Some(Level::Silent),
            "error" => Some(Level::Error),
            "warn" => Some(Level::Warn),
            "info" => Some(Level::Info),
            "debug" => Some(Level::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silent => "Silent",
            Level::Error => "Error",
            Level::Warn => "Warn",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }
}

pub struct Logger {
    log_file: Option<PathBuf>,
    enable_print_log: bool,
    level: Mutex<Level>,
}

impl Logger {
    /// Configure from the environment (and a `.env` file, if present).
    ///
    /// - `LOG_LEVEL`: silent, error, warn, info (default) or debug
    /// - `ENABLE_PRINT_LOG`: "true" to emit messages through `tracing`
    /// - `KOINOS_LOG_FILE`: append messages to this file
    /// - `DISABLE_LOG`: "true" to never write the log file
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env_flag = |name: &str| {
            std::env::var(name)
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false)
        };

        let log_file = if env_flag("DISABLE_LOG") {
            None
        } else {
            std::env::var("KOINOS_LOG_FILE").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from)
        };

        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::parse(&v))
            .unwrap_or(Level::Info);

        Logger {
            log_file,
            enable_print_log: env_flag("ENABLE_PRINT_LOG"),
            level: Mutex::new(level),
        }
    }

    pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        Ok(())
    }

    fn write_to_file(&self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.log_file else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        file.write_all(format!("[{}] {}\n", timestamp, message).as_bytes())?;

        Ok(())
    }

    fn enabled(&self, at: Level) -> bool {
        self.level.lock().map(|l| *l >= at).unwrap_or(true)
    }

    fn log(&self, at: Level, msg: &str) {
        if !self.enabled(at) {
            return;
        }

        if self.enable_print_log {
            match at {
                Level::Error => tracing::error!("{}", msg),
                Level::Warn => tracing::warn!("{}", msg),
                Level::Info => tracing::info!("{}", msg),
                Level::Debug => tracing::debug!("{}", msg),
                Level::Silent => {}
            }
        }

        let formatted_msg = format!("{}: {}", at.as_str().to_uppercase(), msg);
        if let Err(e) = self.write_to_file(&formatted_msg) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    pub fn get_level(&self) -> Level {
        self.level.lock().map(|l| *l).unwrap_or(Level::Info)
    }

    pub fn set_level(&self, new_level: Level) {
        if let Ok(mut level) = self.level.lock() {
            *level = new_level;
        }
    }
}

pub static LOGGER: OnceLock<Logger> = OnceLock::new();
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn with_logger<F, R>(f: F) -> R
where
    F: FnOnce(&Logger) -> R,
{
    let logger = LOGGER.get_or_init(Logger::from_env);

    if logger.enable_print_log {
        TRACING_INITIALIZED.get_or_init(|| {
            // Another subscriber may already be installed by the host application.
            if let Err(e) = Logger::init_tracing() {
                eprintln!("Failed to initialize tracing: {}", e);
            }
        });
    }

    f(logger)
}

pub fn info(msg: &str) {
    with_logger(|logger| logger.log(Level::Info, msg));
}

pub fn warn(msg: &str) {
    with_logger(|logger| logger.log(Level::Warn, msg));
}

pub fn error(msg: &str) {
    with_logger(|logger| logger.log(Level::Error, msg));
}

pub fn debug(msg: &str) {
    with_logger(|logger| logger.log(Level::Debug, msg));
}

pub fn get_log_level() -> Level {
    with_logger(|logger| logger.get_level())
}

pub fn set_log_level(level: Level) {
    with_logger(|logger| logger.set_level(level));
}

/// Set the log level from a string (case insensitive).
///
/// Returns false if the string is not a valid level.
pub fn set_log_level_str(level_str: &str) -> bool {
    match Level::parse(level_str) {
        Some(level) => {
            set_log_level(level);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::parse(" warn "), Some(Level::Warn));
        assert_eq!(Level::parse("loud"), None);
        assert!(Level::Debug > Level::Info);
        assert!(Level::Silent < Level::Error);
    }

    #[test]
    fn test_set_log_level_str() {
        let previous = get_log_level();
        assert!(set_log_level_str("error"));
        assert_eq!(get_log_level(), Level::Error);
        assert!(!set_log_level_str("shouting"));
        assert_eq!(get_log_level(), Level::Error);
        set_log_level(previous);
    }
}
