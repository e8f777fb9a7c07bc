//! HTTP utilities for Jolokia agent calls

use crate::error::FetchError;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Truncate a response body for logging and strip control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Basic-auth credentials
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// HTTP client wrapper for agent calls
#[derive(Clone)]
pub struct JolokiaHttpClient {
    client: Client,
    credentials: Option<Credentials>,
}

impl JolokiaHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration, credentials: Option<Credentials>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(format!("jmxdump/{}", crate::VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// POST a JSON request body and parse the JSON reply
    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value, FetchError> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).json(body);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.user, credentials.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::error!("Agent error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(FetchError::Remote {
                status: status.as_u16(),
                error_type: None,
                message: format!("HTTP request failed: {}", status),
            });
        }

        serde_json::from_str(&response_body).map_err(|e| {
            tracing::error!("Unparseable reply: {}", sanitize_for_log(&response_body));
            FetchError::Malformed(format!("Failed to parse response JSON: {}", e))
        })
    }
}

/// Format an agent error for display
/// Security: avoids echoing raw agent messages, which may carry stack traces
pub fn format_jolokia_error(error: &FetchError) -> String {
    match error {
        FetchError::Transport(_) => {
            "Cannot reach the Jolokia agent. Check --url and that the agent is running.".to_string()
        }
        FetchError::Remote { status: 401, .. } => {
            "Authentication failed. Check --user and --password.".to_string()
        }
        FetchError::Remote { status: 403, .. } => {
            "Permission denied by the agent's access policy.".to_string()
        }
        FetchError::Remote { status: 404, .. } => {
            "Not found. Check the agent URL and the domain name.".to_string()
        }
        FetchError::Remote { status: 500..=599, .. } => {
            "The agent failed to handle the request. Please try again.".to_string()
        }
        FetchError::InvalidUrl(reason) => {
            format!("Invalid agent URL ({}). Check --url.", reason)
        }
        FetchError::Unsupported(_) => "The agent does not support this operation.".to_string(),
        FetchError::Malformed(_) => {
            "The endpoint did not answer like a Jolokia agent. Check --url.".to_string()
        }
        FetchError::Remote { .. } => {
            let sanitized = error
                .to_string()
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(80)
                .collect::<String>();
            format!("Request failed: {}", sanitized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "é".repeat(300);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 600 bytes total]"));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            user: "monitor".to_string(),
            password: Some("s3cret".to_string()),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("monitor"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_format_error_maps_statuses() {
        let remote = |status| FetchError::Remote {
            status,
            error_type: None,
            message: "x".into(),
        };
        assert!(format_jolokia_error(&remote(401)).contains("Authentication"));
        assert!(format_jolokia_error(&remote(503)).contains("try again"));
        assert!(format_jolokia_error(&FetchError::Transport("refused".into())).contains("--url"));
        assert_eq!(
            format_jolokia_error(&FetchError::InvalidUrl("scheme must be http or https, got ftp".into())),
            "Invalid agent URL (scheme must be http or https, got ftp). Check --url."
        );
        assert_eq!(
            format_jolokia_error(&remote(418)),
            "Request failed: remote error 418: x"
        );
    }
}
