use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const MAX_BUFFERED_LINES: usize = 100;

pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

/// Collects log records for the event pane; the terminal is in raw mode so
/// nothing may be written to stderr while the UI runs.
pub struct EventLogLogger {
    buffer: LogBuffer,
    level: LevelFilter,
}

impl EventLogLogger {
    pub fn new(level: LevelFilter) -> (Self, LogBuffer) {
        let buffer = Arc::new(Mutex::new(VecDeque::new()));
        (
            Self {
                buffer: buffer.clone(),
                level,
            },
            buffer,
        )
    }
}

impl Log for EventLogLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{} {}",
            record.level().as_str().to_ascii_lowercase(),
            record.args()
        );
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push_back(line);
            while buffer.len() > MAX_BUFFERED_LINES {
                buffer.pop_front();
            }
        }
    }

    fn flush(&self) {}
}

pub fn install(level: LevelFilter) -> Result<LogBuffer, SetLoggerError> {
    let (logger, buffer) = EventLogLogger::new(level);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(buffer)
}

pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

pub fn drain(buffer: &LogBuffer) -> Vec<String> {
    match buffer.lock() {
        Ok(mut lines) => lines.drain(..).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn records_below_level_are_dropped() {
        let (logger, buffer) = EventLogLogger::new(LevelFilter::Info);
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("noise"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("advisor slow"))
                .build(),
        );
        assert_eq!(drain(&buffer), vec!["warn advisor slow".to_string()]);
        assert!(drain(&buffer).is_empty());
    }

    #[test]
    fn buffer_is_bounded() {
        let (logger, buffer) = EventLogLogger::new(LevelFilter::Trace);
        for idx in 0..(MAX_BUFFERED_LINES + 20) {
            logger.log(
                &Record::builder()
                    .level(Level::Info)
                    .args(format_args!("line {idx}"))
                    .build(),
            );
        }
        let lines = drain(&buffer);
        assert_eq!(lines.len(), MAX_BUFFERED_LINES);
        assert_eq!(lines[0], "info line 20");
    }

    #[test]
    fn level_parsing_defaults_to_warn() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" TRACE ")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Warn);
        assert_eq!(parse_level(None), LevelFilter::Warn);
    }
}
