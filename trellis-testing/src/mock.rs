// Mock utilities for testing

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, clonable record of calls
///
/// Clones share the same log, so a test can keep one handle while the code
/// under test owns another.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, call: impl Into<String>) {
        self.lock().push(call.into());
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of calls recorded as exactly `call`
    pub fn count_of(&self, call: &str) -> usize {
        self.lock().iter().filter(|c| *c == call).count()
    }

    pub fn was_called(&self, call: &str) -> bool {
        self.lock().iter().any(|c| c == call)
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Stand-in for a data-access manager
///
/// Records every call and hands back a canned value. Register it through a
/// manager factory and keep a clone of its [`CallLog`] to verify calls.
#[derive(Debug, Clone)]
pub struct MockManager<T> {
    module: String,
    log: CallLog,
    return_value: Arc<Mutex<Option<T>>>,
}

impl<T> MockManager<T> {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log: CallLog::new(),
            return_value: Arc::new(Mutex::new(None)),
        }
    }

    /// Share an existing call log
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn with_return(self, value: T) -> Self {
        *self
            .return_value
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(value);
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Record `method` and return the canned value
    pub fn call(&self, method: &str) -> Option<T>
    where
        T: Clone,
    {
        self.log.record(format!("{}::{}", self.module, method));
        self.return_value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.log.call_count()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.log.was_called(&format!("{}::{}", self.module, method))
    }
}
