//! Error type for prompt submission, plus helpers mapping HTTP/reqwest errors.

/// Errors from submitting a prompt to the language-model endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    // Transport errors (retried in streaming chat mode)
    /// Network-level error (connection refused, reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The underlying transport gave up waiting for the endpoint.
    #[error("request timed out")]
    Timeout,
    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    // Terminal errors
    /// Every attempt of the retry policy failed.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The failure of the final attempt.
        #[source]
        last: Box<ClientError>,
    },
    /// A `data:` line did not contain valid JSON.
    #[error("malformed stream chunk {line:?}: {source}")]
    MalformedChunk {
        /// The payload after the `data: ` prefix.
        line: String,
        /// The JSON decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// The response decoded but lacked the fields the client relies on.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
    /// Reading the response body failed midway.
    #[error("stream error: {0}")]
    Stream(String),
    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Appending to the audit log failed.
    #[error("audit log: {0}")]
    Audit(#[from] std::io::Error),
}

impl ClientError {
    /// Whether this is a transport failure that the retry policy may retry.
    ///
    /// Statuses count only when the endpoint may recover on its own: 408, 429
    /// and 5xx. Other client errors (400, 401, 404, ...) point at the request
    /// or the configuration and fail at once.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
            _ => false,
        }
    }
}

/// Map a non-success HTTP status and its body to a [`ClientError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ClientError {
    ClientError::Status {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] to a [`ClientError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Network(Box::new(err))
    }
}
