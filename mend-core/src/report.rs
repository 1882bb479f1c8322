//! Error reports - the structured input to the healing pipeline.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fallback error type when raw text carries no recognizable exception line.
const UNKNOWN_ERROR_TYPE: &str = "UnknownError";

/// `File "api/handlers.py", line 42` - the location line of a traceback.
static FILE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"File "([^"]+)", line (\d+)"#).expect("valid regex")
});

/// `IndexError: list index out of range` - an exception line.
static ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*([A-Za-z_][A-Za-z0-9_.]*(?:Error|Exception|Warning)):\s*(.+)$")
        .expect("valid regex")
});

/// A structured view of one error occurrence.
///
/// Immutable once created. Usually produced by [`ErrorReport::parse`] from
/// raw error text, but callers that already have structure can build one
/// directly with [`ErrorReport::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Exception class name, e.g. `IndexError`.
    pub error_type: String,
    /// Path of the erroring file; may be empty when unknown.
    pub file_path: String,
    /// The error message text.
    pub error_message: String,
    /// Line number within the file, when the raw text named one.
    pub line_number: Option<u32>,
    /// Original source of the erroring file, when the caller supplied it.
    pub file_content: Option<String>,
}

impl ErrorReport {
    /// Create a report from already-structured fields.
    pub fn new(
        error_type: impl Into<String>,
        file_path: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            error_type: error_type.into(),
            file_path: file_path.into(),
            error_message: error_message.into(),
            line_number: None,
            file_content: None,
        }
    }

    /// Attach the original source of the erroring file.
    pub fn with_file_content(mut self, content: impl Into<String>) -> Self {
        self.file_content = Some(content.into());
        self
    }

    /// Attach the line number.
    pub fn with_line_number(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }

    /// Parse raw error text into a report.
    ///
    /// Takes the last `File "...", line N` location and the last exception
    /// line of a traceback; a bare `Type: message` string parses the same
    /// way. Text with no recognizable exception line falls back to
    /// `UnknownError` with the whitespace-collapsed text as the message.
    pub fn parse(raw: &str) -> Self {
        let (file_path, line_number) = FILE_LINE
            .captures_iter(raw)
            .last()
            .map(|caps| {
                let path = caps[1].to_string();
                let line = caps[2].parse::<u32>().ok();
                (path, line)
            })
            .unwrap_or_default();

        let (error_type, error_message) = ERROR_LINE
            .captures_iter(raw)
            .last()
            .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
            .unwrap_or_else(|| (UNKNOWN_ERROR_TYPE.to_string(), collapse_whitespace(raw)));

        Self {
            error_type,
            file_path,
            error_message,
            line_number,
            file_content: None,
        }
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACEBACK: &str = r#"Traceback (most recent call last):
  File "main.py", line 3, in <module>
    run()
  File "api/handlers.py", line 42, in run
    return items[10]
IndexError: list index out of range"#;

    #[test]
    fn parse_extracts_last_traceback_frame() {
        let report = ErrorReport::parse(TRACEBACK);
        assert_eq!(report.error_type, "IndexError");
        assert_eq!(report.error_message, "list index out of range");
        assert_eq!(report.file_path, "api/handlers.py");
        assert_eq!(report.line_number, Some(42));
    }

    #[test]
    fn parse_handles_bare_error_line() {
        let report = ErrorReport::parse("IndexError: list index out of range");
        assert_eq!(report.error_type, "IndexError");
        assert_eq!(report.error_message, "list index out of range");
        assert_eq!(report.file_path, "");
        assert_eq!(report.line_number, None);
    }

    #[test]
    fn parse_unrecognized_text_falls_back() {
        let report = ErrorReport::parse("segfault   at\n0xdeadbeef");
        assert_eq!(report.error_type, "UnknownError");
        assert_eq!(report.error_message, "segfault at 0xdeadbeef");
    }

    #[test]
    fn parse_accepts_dotted_exception_names() {
        let report = ErrorReport::parse("requests.exceptions.ConnectionError: refused");
        assert_eq!(report.error_type, "requests.exceptions.ConnectionError");
        assert_eq!(report.error_message, "refused");
    }

    #[test]
    fn builders_attach_content_and_line() {
        let report = ErrorReport::new("TypeError", "app.py", "bad operand")
            .with_file_content("x = 1 + 'a'")
            .with_line_number(1);
        assert_eq!(report.file_content.as_deref(), Some("x = 1 + 'a'"));
        assert_eq!(report.line_number, Some(1));
    }

    #[test]
    fn collapse_whitespace_flattens_newlines() {
        assert_eq!(collapse_whitespace("a\n  b\t c"), "a b c");
    }
}
