use std::fmt::Write;

use serde::Deserialize;

/// Error body returned by the REST gateway.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Human readable message.
    pub message: String,
    /// Database error code, e.g. `23505`.
    #[serde(default)]
    pub code: Option<String>,
    /// Extra context from the database.
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Message with the error code and details appended when present.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut text = self.message.clone();
        if let Some(code) = &self.code {
            let _ = write!(text, " ({code})");
        }
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            text.push_str(": ");
            text.push_str(details);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_includes_code() {
        let error: ErrorResponse = serde_json::from_str(
            r#"{"message": "duplicate key value", "code": "23505", "details": null, "hint": null}"#,
        )
        .unwrap();
        assert_eq!(error.describe(), "duplicate key value (23505)");
    }
}
