//! Timer registry backing the `start`/`stop`/`time`/`timeEnd` methods

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{OnelogError, OnelogResult};

/// Label used when a timer method is called without arguments
pub const DEFAULT_LABEL: &str = "default";

static GLOBAL_TIMERS: Lazy<Arc<TimerRegistry>> = Lazy::new(|| Arc::new(TimerRegistry::new()));

/// Mapping from a label to the instant it was started
///
/// Starting a label twice overwrites the first start. Stopping a label
/// reads the entry without removing it, so a later `stop` measures from
/// the same start.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: Mutex<HashMap<String, Instant>>,
}

impl TimerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<TimerRegistry> {
        Arc::clone(&GLOBAL_TIMERS)
    }

    /// Record the current instant for `label`
    pub fn start(&self, label: &str) {
        self.timers.lock().insert(label.to_string(), Instant::now());
    }

    /// Milliseconds elapsed since `label` was started
    pub fn stop(&self, label: &str) -> OnelogResult<u64> {
        let timers = self.timers.lock();
        let started = timers
            .get(label)
            .ok_or_else(|| OnelogError::UnknownTimerLabel(label.to_string()))?;
        Ok(started.elapsed().as_millis() as u64)
    }

    /// Check if a label has been started
    pub fn contains(&self, label: &str) -> bool {
        self.timers.lock().contains_key(label)
    }

    /// Number of labels ever started
    pub fn len(&self) -> usize {
        self.timers.lock().len()
    }

    /// Check if no label has been started
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derive a timer label from call arguments
pub fn label_from_args(args: &[Value]) -> String {
    match args.first() {
        Some(Value::String(label)) => label.clone(),
        Some(other) => other.to_string(),
        None => DEFAULT_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_start_then_stop_is_small() {
        let timers = TimerRegistry::new();
        timers.start("query");
        let elapsed = timers.stop("query").unwrap();
        assert!(elapsed < 50, "elapsed {}ms", elapsed);
    }

    #[test]
    fn test_stop_measures_delay() {
        let timers = TimerRegistry::new();
        timers.start("sleep");
        thread::sleep(Duration::from_millis(20));
        assert!(timers.stop("sleep").unwrap() >= 20);
    }

    #[test]
    fn test_unknown_label() {
        let timers = TimerRegistry::new();
        assert!(matches!(
            timers.stop("never"),
            Err(OnelogError::UnknownTimerLabel(label)) if label == "never"
        ));
    }

    #[test]
    fn test_restart_overwrites() {
        let timers = TimerRegistry::new();
        timers.start("a");
        thread::sleep(Duration::from_millis(30));
        timers.start("a");
        assert!(timers.stop("a").unwrap() < 30);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_stop_keeps_entry() {
        let timers = TimerRegistry::new();
        timers.start("kept");
        timers.stop("kept").unwrap();
        assert!(timers.contains("kept"));
        assert!(timers.stop("kept").is_ok());
    }

    #[test]
    fn test_labels_are_independent() {
        let timers = TimerRegistry::new();
        timers.start("first");
        thread::sleep(Duration::from_millis(20));
        timers.start("second");
        assert!(timers.stop("first").unwrap() >= timers.stop("second").unwrap());
    }

    #[test]
    fn test_label_from_args() {
        assert_eq!(label_from_args(&[json!("db")]), "db");
        assert_eq!(label_from_args(&[json!(42), json!("x")]), "42");
        assert_eq!(label_from_args(&[]), DEFAULT_LABEL);
    }
}
