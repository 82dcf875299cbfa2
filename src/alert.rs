//! Alert sink seam
//!
//! The monitor hands every detection to an [`AlertSink`]. The default
//! sink only prints; implementations wired in by downstream users can
//! dispatch notifications, persist events, or invoke external processes.

use crate::keywords::Keyword;

/// Receiver for detected distress keywords.
///
/// Invoked at most once per monitor iteration with the first keyword
/// found in the transcript. No return value is consumed; failures inside
/// a sink are the sink's own problem.
pub trait AlertSink {
    fn trigger(&mut self, keyword: &Keyword);
}

/// Default sink: prints an alert line to stdout.
pub struct ConsoleAlertSink;

impl AlertSink for ConsoleAlertSink {
    fn trigger(&mut self, keyword: &Keyword) {
        println!(
            "Alert triggered! Keyword detected: {} ({})",
            keyword.text(),
            keyword.language()
        );
    }
}
