//! Scrolling race event log

use std::collections::VecDeque;

use crate::consts::{LOG_CAPACITY, LOG_FADE_MS, LOG_HOLD_MS};

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub color: String,
    pub created_ms: f64,
}

impl LogEntry {
    /// Opacity at `now_ms`: solid while held, then a linear fade
    pub fn alpha(&self, now_ms: f64) -> f32 {
        let age = now_ms - self.created_ms;
        if age <= LOG_HOLD_MS {
            1.0
        } else {
            (1.0 - (age - LOG_HOLD_MS) / LOG_FADE_MS).clamp(0.0, 1.0) as f32
        }
    }
}

/// Capped, self-expiring list of transient messages (oldest first)
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, color: &str, now_ms: f64) {
        self.entries.push_back(LogEntry {
            text: text.into(),
            color: color.to_string(),
            created_ms: now_ms,
        });
        while self.entries.len() > LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Drop entries that have fully faded
    pub fn expire(&mut self, now_ms: f64) {
        self.entries
            .retain(|e| now_ms - e.created_ms < LOG_HOLD_MS + LOG_FADE_MS);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = EventLog::new();
        for i in 0..7 {
            log.push(format!("msg {}", i), "#fff", 0.0);
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.entries().next().map(|e| e.text.as_str()), Some("msg 2"));
    }

    #[test]
    fn test_fade_and_expire() {
        let mut log = EventLog::new();
        log.push("boost", "#f00", 1000.0);
        let entry = log.entries().next().unwrap().clone();
        assert_eq!(entry.alpha(2500.0), 1.0);
        assert!((entry.alpha(3500.0) - 0.5).abs() < 1e-6);

        log.expire(3999.0);
        assert_eq!(log.len(), 1);
        log.expire(4000.0);
        assert!(log.is_empty());
    }
}
