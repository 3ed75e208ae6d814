//! Client configuration, resolved once from the environment.

use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::ClientError;
use crate::retry::RetryPolicy;

/// Endpoint used when `LLM_URL` is not set.
pub const DEFAULT_URL: &str = "http://localhost:8001/v1/chat/completions";

/// Model named in chat requests when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Output token limit when `LLM_MAX_TOKENS` is not set.
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Audit log path when `LLM_AUDIT_LOG` is not set.
pub const DEFAULT_AUDIT_LOG: &str = "app/log.md";

/// Final path segment that selects the generate-style backend.
const GENERATE_SEGMENT: &str = "generate";

/// Which response format the configured endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// OpenAI-compatible chat completions, streamed as server-sent events.
    Streaming,
    /// Generate-style text completion answered in one response.
    SingleShot,
}

impl BackendKind {
    /// Infer the backend from the URL's final path segment.
    ///
    /// `.../generate` selects [`BackendKind::SingleShot`]; anything else
    /// selects [`BackendKind::Streaming`].
    pub fn from_url(url: &Url) -> Self {
        match url.path_segments().and_then(|mut segments| segments.next_back()) {
            Some(GENERATE_SEGMENT) => Self::SingleShot,
            _ => Self::Streaming,
        }
    }
}

/// Settings for a [`PromptClient`](crate::PromptClient).
///
/// # Example
///
/// ```no_run
/// use aimarketing_llm::{BackendKind, ClientConfig};
///
/// let config = ClientConfig::new("http://localhost:9000/generate")?
///     .max_tokens(200)
///     .audit_log("logs/prompts.md");
/// assert_eq!(config.backend(), BackendKind::SingleShot);
/// # Ok::<(), aimarketing_llm::ClientError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) url: Url,
    pub(crate) backend: BackendKind,
    pub(crate) model: String,
    pub(crate) max_tokens: u32,
    pub(crate) stream: bool,
    pub(crate) audit_log: PathBuf,
    pub(crate) retry: RetryPolicy,
}

impl ClientConfig {
    /// Configuration for `url` with every other setting at its default.
    pub fn new(url: &str) -> Result<Self, ClientError> {
        let url = Url::parse(url)
            .map_err(|e| ClientError::InvalidConfig(format!("endpoint URL {url:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "endpoint URL must be http or https, got {}",
                url.scheme()
            )));
        }
        Ok(Self {
            backend: BackendKind::from_url(&url),
            url,
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: true,
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
            retry: RetryPolicy::default(),
        })
    }

    /// Read `LLM_URL`, `LLM_MODEL`, `LLM_MAX_TOKENS`, `LLM_STREAM` and
    /// `LLM_AUDIT_LOG` from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let url = lookup("LLM_URL").unwrap_or_else(|| DEFAULT_URL.into());
        let mut config = Self::new(&url)?;

        if let Some(model) = lookup("LLM_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("LLM_MAX_TOKENS") {
            config.max_tokens = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ClientError::InvalidConfig(format!(
                        "LLM_MAX_TOKENS must be a positive integer, got {raw:?}"
                    )));
                }
            };
        }
        if let Some(raw) = lookup("LLM_STREAM") {
            config.stream = parse_flag(&raw).ok_or_else(|| {
                ClientError::InvalidConfig(format!("LLM_STREAM must be true or false, got {raw:?}"))
            })?;
        }
        if let Some(path) = lookup("LLM_AUDIT_LOG") {
            config.audit_log = PathBuf::from(path);
        }

        tracing::debug!(
            url = %config.url,
            backend = ?config.backend,
            model = %config.model,
            max_tokens = config.max_tokens,
            "resolved LLM client configuration"
        );
        Ok(config)
    }

    /// Override the model named in chat requests.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the output token limit.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Ask the chat endpoint for a streamed (`true`) or whole (`false`) reply.
    ///
    /// Has no effect on the generate-style backend.
    #[must_use]
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Override the audit log path.
    #[must_use]
    pub fn audit_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_log = path.into();
        self
    }

    /// Override the retry policy for chat requests.
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// The endpoint URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The backend inferred from the endpoint URL.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// The model named in chat requests.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// The output token limit.
    pub fn max_token_limit(&self) -> u32 {
        self.max_tokens
    }

    /// Whether chat replies are requested as a stream.
    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    /// The audit log path.
    pub fn audit_log_path(&self) -> &Path {
        &self.audit_log
    }

    /// The retry policy for chat requests.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
