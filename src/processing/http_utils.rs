//! HTTP utilities for provider clients
//!
//! Shared client construction and error-body handling for remove.bg and
//! Replicate.

use crate::processing::ProcessingError;
use crate::utils::truncate_str;
use reqwest::{Client as HttpClient, Response};
use serde_json::Value;
use std::time::Duration;

/// Maximum number of characters of an error body kept in errors and logs
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Creates an HTTP client with a per-request timeout.
///
/// Prevents a hung provider from stalling a job forever.
#[must_use]
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Maps a transport-level reqwest error
pub(crate) fn network_error(e: &reqwest::Error) -> ProcessingError {
    if e.is_timeout() {
        ProcessingError::Network(format!("request timed out: {e}"))
    } else {
        ProcessingError::Network(e.to_string())
    }
}

/// Consumes a non-success response and turns it into `ProcessingError::Api`
pub(crate) async fn api_error(response: Response) -> ProcessingError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProcessingError::Api {
        status,
        message: describe_error_body(&body),
    }
}

/// Extracts a readable message from a provider error body.
///
/// Understands remove.bg (`{"errors":[{"title":..}]}`) and Replicate
/// (`{"detail":..}` / `{"title":..}`) JSON, hides HTML error pages, and
/// truncates anything else.
pub(crate) fn describe_error_body(body: &str) -> String {
    let trimmed = body.trim_start();

    // Nginx/proxy error pages
    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") || trimmed.starts_with("<HTML")
    {
        return "server returned HTML error page".to_string();
    }

    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        if let Some(errors) = json.get("errors").and_then(Value::as_array) {
            let titles: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("title").and_then(Value::as_str))
                .collect();
            if !titles.is_empty() {
                return titles.join("; ");
            }
        }
        for key in ["detail", "title", "error"] {
            if let Some(text) = json.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }

    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        format!("{}... (truncated)", truncate_str(trimmed, MAX_ERROR_BODY_CHARS))
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removebg_error_titles() {
        let body = r#"{"errors":[{"title":"File too large","code":"file_too_large"},{"title":"Bad format"}]}"#;
        assert_eq!(describe_error_body(body), "File too large; Bad format");
    }

    #[test]
    fn test_replicate_detail() {
        let body = r#"{"detail":"Invalid token.","status":401}"#;
        assert_eq!(describe_error_body(body), "Invalid token.");
    }

    #[test]
    fn test_html_is_hidden() {
        let body = "<!DOCTYPE html><html><body>502 Bad Gateway</body></html>";
        assert_eq!(describe_error_body(body), "server returned HTML error page");
    }

    #[test]
    fn test_long_plain_body_is_truncated() {
        let body = "x".repeat(2000);
        let described = describe_error_body(&body);
        assert!(described.ends_with("... (truncated)"));
        assert_eq!(described.len(), MAX_ERROR_BODY_CHARS + "... (truncated)".len());
    }
}
