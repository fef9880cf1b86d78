use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::{log as console_log, log_error};

/// Forwards `log` records to the browser console.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_record(record.level(), record.target(), &record.args().to_string());
        match record.level() {
            Level::Error | Level::Warn => log_error(&line),
            _ => console_log(&line),
        }
    }

    fn flush(&self) {}
}

pub fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[{} {}] {}", level, target, message)
}

/// Installs the console logger. A second call only adjusts the level.
pub fn init_logger(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}
