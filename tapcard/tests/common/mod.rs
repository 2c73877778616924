// Shared helpers for the integration tests. Each test crate pulls this in
// through a `#[path]` module, so not every helper is used everywhere.
#![allow(dead_code)]

pub mod fixtures;

use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Global logger for test binaries: records every message so tests can
/// assert on diagnostics, and forwards to env_logger (`RUST_LOG`) for
/// human-readable output.
pub struct CaptureLogger {
    inner: env_logger::Logger,
    records: Mutex<Vec<(Level, String)>>,
}

impl CaptureLogger {
    /// Messages logged at `level` that contain `needle`.
    pub fn matching(&self, level: Level, needle: &str) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, msg)| *l == level && msg.contains(needle))
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
        if self.inner.matches(record) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

/// Install the capturing logger once per test binary and return it.
pub fn init_logger() -> &'static CaptureLogger {
    let logger = LOGGER.get_or_init(|| CaptureLogger {
        inner: env_logger::Builder::from_default_env().is_test(true).build(),
        records: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    logger
}
