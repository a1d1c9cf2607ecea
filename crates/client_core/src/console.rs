//! Console sinks: the `log`/`error` channel the bus reports through.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use tracing::{error, info};

pub const DEFAULT_CONSOLE_CAPACITY: usize = 500;

pub trait ConsoleSink: Send + Sync {
    fn log(&self, message: &str, category: &str);
    fn error(&self, message: &str, category: &str);
}

/// Forwards console lines to `tracing` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsole;

impl ConsoleSink for TracingConsole {
    fn log(&self, message: &str, category: &str) {
        info!(category = category, "{message}");
    }

    fn error(&self, message: &str, category: &str) {
        error!(category = category, "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub level: ConsoleLevel,
    pub category: String,
    pub message: String,
    pub logged_at: DateTime<Utc>,
}

/// Bounded buffer backing the console panel. Also forwards to `tracing`.
pub struct ConsoleLog {
    capacity: usize,
    entries: Mutex<VecDeque<ConsoleEntry>>,
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CONSOLE_CAPACITY)
    }
}

impl ConsoleLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> Vec<ConsoleEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|entry| entry.level == ConsoleLevel::Error)
            .count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, level: ConsoleLevel, message: &str, category: &str) {
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(ConsoleEntry {
            level,
            category: category.to_string(),
            message: message.to_string(),
            logged_at: Utc::now(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ConsoleEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConsoleSink for ConsoleLog {
    fn log(&self, message: &str, category: &str) {
        info!(category = category, "{message}");
        self.push(ConsoleLevel::Log, message, category);
    }

    fn error(&self, message: &str, category: &str) {
        error!(category = category, "{message}");
        self.push(ConsoleLevel::Error, message, category);
    }
}
