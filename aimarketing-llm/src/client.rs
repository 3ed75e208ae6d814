//! Prompt submission client.

use crate::audit::AuditLog;
use crate::config::{BackendKind, ClientConfig};
use crate::error::{ClientError, map_http_status, map_reqwest_error};
use crate::normalize::normalize_reply;
use crate::prompt::PromptPair;
use crate::sink::ReplySink;
use crate::streaming::assemble_stream;
use crate::types::{ChatCompletion, ChatMessage, ChatRequest, GenerateRequest, GenerateResponse};

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Republish the growing reply to the sink while it streams.
    pub incremental: bool,
    /// Append the exchange to the audit log.
    pub audit: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            incremental: true,
            audit: true,
        }
    }
}

impl SubmitOptions {
    /// No incremental updates and no audit record.
    pub fn quiet() -> Self {
        Self {
            incremental: false,
            audit: false,
        }
    }
}

/// Sends a [`PromptPair`] to the configured endpoint and returns the reply.
///
/// The endpoint variant is fixed by [`ClientConfig::backend`]:
/// - [`BackendKind::Streaming`]: POST to an OpenAI-compatible chat endpoint
///   through the retry policy, reading the server-sent-event stream.
/// - [`BackendKind::SingleShot`]: one PUT to a generate-style endpoint, no
///   retry, with the echoed prompt stripped from the reply.
///
/// # Example
///
/// ```no_run
/// use aimarketing_llm::{NoopSink, PromptClient, PromptPair, SubmitOptions};
///
/// # async fn run() -> Result<(), aimarketing_llm::ClientError> {
/// let client = PromptClient::from_env()?;
/// let prompt = PromptPair::new("You write short emails.", "COMPANY: Acme\n");
/// let reply = client.submit(&prompt, SubmitOptions::quiet(), &mut NoopSink).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub struct PromptClient {
    config: ClientConfig,
    audit: AuditLog,
    client: reqwest::Client,
}

impl PromptClient {
    /// A client for `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            audit: AuditLog::new(config.audit_log.clone()),
            config,
            client: reqwest::Client::new(),
        }
    }

    /// A client configured from the `LLM_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// The configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit `prompt` and return the normalized reply.
    ///
    /// With `options.incremental`, `sink` receives the whole normalized reply
    /// after every streamed chunk (once, at the end, for non-streaming
    /// variants). With `options.audit`, the exchange is appended to the audit
    /// log before returning.
    pub async fn submit(
        &self,
        prompt: &PromptPair,
        options: SubmitOptions,
        sink: &mut dyn ReplySink,
    ) -> Result<String, ClientError> {
        tracing::debug!(
            url = %self.config.url,
            backend = ?self.config.backend,
            incremental = options.incremental,
            "submitting prompt"
        );

        let reply = match self.config.backend {
            BackendKind::Streaming if self.config.stream => {
                let sink = if options.incremental { Some(sink) } else { None };
                self.chat_streamed(prompt, sink).await?
            }
            BackendKind::Streaming => {
                let reply = self.chat_whole(prompt).await?;
                if options.incremental {
                    sink.publish(&reply);
                }
                reply
            }
            BackendKind::SingleShot => {
                let reply = self.generate(prompt).await?;
                if options.incremental {
                    sink.publish(&reply);
                }
                reply
            }
        };

        if options.audit {
            self.audit.append(prompt, &reply).await?;
        }

        tracing::info!(chars = reply.chars().count(), "received reply");
        Ok(reply)
    }

    fn chat_request(&self, prompt: &PromptPair, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::new("system", prompt.system()),
                ChatMessage::new("user", prompt.user()),
            ],
            max_tokens: self.config.max_tokens,
            stream,
        }
    }

    async fn chat_streamed(
        &self,
        prompt: &PromptPair,
        sink: Option<&mut dyn ReplySink>,
    ) -> Result<String, ClientError> {
        let body = self.chat_request(prompt, true);
        let response = self.post_with_retry(&body).await?;
        assemble_stream(response.bytes_stream(), sink).await
    }

    async fn chat_whole(&self, prompt: &PromptPair) -> Result<String, ClientError> {
        let body = self.chat_request(prompt, false);
        let response = self.post_with_retry(&body).await?;
        let text = response.text().await.map_err(map_reqwest_error)?;

        let completion: ChatCompletion = serde_json::from_str(&text)
            .map_err(|e| ClientError::UnexpectedResponse(format!("chat completion: {e}")))?;
        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            ClientError::UnexpectedResponse("chat completion has no choices".into())
        })?;
        Ok(normalize_reply(&choice.message.content))
    }

    /// POST a chat request, retrying transport failures per the policy.
    async fn post_with_retry(&self, body: &ChatRequest) -> Result<reqwest::Response, ClientError> {
        self.config
            .retry
            .run(move |attempt| async move {
                tracing::debug!(attempt, url = %self.config.url, model = %body.model, "sending chat request");
                let response = self
                    .client
                    .post(self.config.url.clone())
                    .header("content-type", "application/json")
                    .json(body)
                    .send()
                    .await
                    .map_err(map_reqwest_error)?;

                let status = response.status();
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(map_http_status(status, &text));
                }
                Ok::<_, ClientError>(response)
            })
            .await
    }

    async fn generate(&self, prompt: &PromptPair) -> Result<String, ClientError> {
        let input = prompt.input_text();
        let body = GenerateRequest::new(input.clone(), self.config.max_tokens);

        tracing::debug!(url = %self.config.url, "sending generate request");
        let response = self
            .client
            .put(self.config.url.clone())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(map_http_status(status, &text));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::UnexpectedResponse(format!("generate response: {e}")))?;
        let generated = parsed.sentences.into_iter().next().ok_or_else(|| {
            ClientError::UnexpectedResponse("generate response has no sentences".into())
        })?;

        Ok(normalize_reply(strip_echo(&generated, &input)))
    }
}

/// Remove one leading copy of the prompt echoed back by a generate endpoint.
///
/// A reply that does not start with the prompt is returned unchanged.
pub(crate) fn strip_echo<'a>(generated: &'a str, input: &str) -> &'a str {
    match generated.strip_prefix(input) {
        Some(rest) => rest,
        None => {
            tracing::debug!("generated text does not echo the prompt; keeping it whole");
            generated
        }
    }
}
