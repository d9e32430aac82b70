use log::{debug, warn};

const DEFAULT_MAX_LINES: usize = 20;

/// Receives the human readable report lines of an aggregation run.
pub trait LogSink {
    fn log_info(&mut self, message: String);
    fn log_error(&mut self, message: String);
}

/// Collects info and error lines for one run. Errors beyond `max_lines` are
/// only counted.
#[derive(Debug, Clone)]
pub struct FilteredLog {
    title: String,
    max_lines: usize,
    info_messages: Vec<String>,
    error_messages: Vec<String>,
    skipped_errors: usize,
}

impl FilteredLog {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_max_lines(title, DEFAULT_MAX_LINES)
    }

    pub fn with_max_lines(title: impl Into<String>, max_lines: usize) -> Self {
        Self {
            title: title.into(),
            max_lines,
            info_messages: Vec::new(),
            error_messages: Vec::new(),
            skipped_errors: 0,
        }
    }

    pub fn info_messages(&self) -> &[String] {
        &self.info_messages
    }

    /// The title followed by every recorded error, or nothing if no error was logged.
    pub fn error_messages(&self) -> Vec<String> {
        if self.error_messages.is_empty() {
            return Vec::new();
        }
        std::iter::once(self.title.clone())
            .chain(self.error_messages.iter().cloned())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.error_messages.is_empty()
    }

    pub fn skipped_errors(&self) -> usize {
        self.skipped_errors
    }

    pub fn log_summary(&mut self) {
        if self.skipped_errors > 0 {
            self.error_messages.push(format!(
                "  ... skipped logging of {} additional errors",
                self.skipped_errors
            ));
        }
    }
}

impl LogSink for FilteredLog {
    fn log_info(&mut self, message: String) {
        debug!("{message}");
        self.info_messages.push(message);
    }

    fn log_error(&mut self, message: String) {
        warn!("{message}");
        if self.error_messages.len() < self.max_lines {
            self.error_messages.push(message);
        } else {
            self.skipped_errors += 1;
        }
    }
}
