use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A structural problem found while running a script, such as a jump to a
/// label that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Short headline.
    pub title: String,
    /// What went wrong.
    pub message: String,
    /// Ordered `(key, value)` pairs shown below the message.
    pub details: Vec<(String, String)>,
}

impl Report {
    /// A report without details.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Append a detail row.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// The first detail stored under `key`.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)?;
        for (key, value) in &self.details {
            write!(f, "\n  {key}: {value}")?;
        }
        Ok(())
    }
}

/// Receives structural error reports, separately from returned errors.
pub trait Reporter: fmt::Debug + Send + Sync {
    /// Handle one report.
    fn report(&self, report: &Report);
}

/// Default reporter: logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, report: &Report) {
        tracing::error!(
            title = %report.title,
            details = ?report.details,
            "{}",
            report.message
        );
    }
}

/// Keeps every report in memory. Clones share the same list.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl CollectingReporter {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report received so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, report: &Report) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_details() {
        let report = Report::new("Label not found", "No label named 'Nxt'")
            .with_detail("Label", "Nxt")
            .with_detail("Did you mean", "Next");
        assert_eq!(
            report.to_string(),
            "Label not found: No label named 'Nxt'\n  Label: Nxt\n  Did you mean: Next"
        );
        assert_eq!(report.detail("Did you mean"), Some("Next"));
        assert_eq!(report.detail("missing"), None);
    }

    #[test]
    fn collecting_reporter_shares_between_clones() {
        let reporter = CollectingReporter::new();
        let handle = reporter.clone();
        reporter.report(&Report::new("a", "b"));
        assert_eq!(handle.reports().len(), 1);
        assert!(!handle.is_empty());
    }
}
