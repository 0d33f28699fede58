//! Where the test's log transcript goes


use std::fmt;

use log::Level;


/// The log target used for the transcript
pub const LOG_TARGET: &str = "etest";


/// A sink for the test's log transcript
///
/// The transcript is what the operator sees: one line per notable event, with
/// the last line naming the check that failed, if any.
pub trait Report {
    fn log(&mut self, level: Level, message: fmt::Arguments);
}


/// Forwards the transcript to the `log` facade
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReport;

impl Report for LogReport {
    fn log(&mut self, level: Level, message: fmt::Arguments) {
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}


/// Records the transcript in memory, in addition to forwarding it to `log`
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries whose message contains `text`
    pub fn count(&self, text: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.message.contains(text))
            .count()
    }

    /// The most recent entry, if any
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Messages of all entries logged at the `Error` level
    pub fn errors(&self) -> impl Iterator<Item=&str> {
        self.entries
            .iter()
            .filter(|entry| entry.level == Level::Error)
            .map(|entry| entry.message.as_str())
    }
}

impl Report for Transcript {
    fn log(&mut self, level: Level, message: fmt::Arguments) {
        LogReport.log(level, message);

        self.entries.push(
            Entry {
                level,
                message: message.to_string(),
            }
        );
    }
}


/// A line of the transcript
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub level:   Level,
    pub message: String,
}
