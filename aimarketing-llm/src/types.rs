//! Request/response wire types for the two endpoint variants.
//!
//! Streaming chat (OpenAI-compatible `/v1/chat/completions`):
//! - POST `{model, messages, max_tokens, stream}`
//! - response is `text/event-stream`, one `data: <json>` line per delta,
//!   terminated by `data: [DONE]`
//!
//! Single-shot generate (`.../generate`):
//! - PUT `{sentences:[prompt], tokens_to_generate, ...sampling}`
//! - response is `{sentences:[text]}` with the prompt echoed as a prefix

use serde::{Deserialize, Serialize};

/// Chat-completion request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// System message followed by the user message.
    pub messages: Vec<ChatMessage>,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Whether the endpoint should stream deltas.
    pub stream: bool,
}

/// A message in the chat-completion format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    /// Message text content.
    pub content: String,
}

impl ChatMessage {
    pub(crate) fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// One decoded `data:` line of a streaming chat response.
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    /// Choices carried by this chunk; only the first is read.
    pub choices: Vec<ChunkChoice>,
}

/// A choice within a streaming chunk.
#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    /// The incremental fragment of the reply.
    pub delta: DeltaChunk,
}

/// Incremental fragment of the assistant's reply.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct DeltaChunk {
    /// Role, usually present only on the first chunk.
    #[serde(default)]
    pub role: Option<String>,
    /// Text to append; absent or null on role-only and final chunks.
    #[serde(default)]
    pub content: Option<String>,
}

/// Non-streaming chat-completion response body.
#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    /// Completion choices; only the first is read.
    pub choices: Vec<CompletionChoice>,
}

/// A choice within a non-streaming completion.
#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    /// The assistant message.
    pub message: ChatMessage,
}

/// Generate-style request body.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    /// Literal prompt text; exactly one entry.
    pub sentences: Vec<String>,
    /// Maximum number of tokens to generate.
    pub tokens_to_generate: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Prepend a beginning-of-sequence token.
    #[serde(rename = "add_BOS")]
    pub add_bos: bool,
    /// Top-k sampling; 0 disables it.
    pub top_k: u32,
    /// Nucleus sampling probability.
    pub top_p: f64,
    /// Greedy decoding.
    pub greedy: bool,
    /// Return the full probability distribution.
    pub all_probs: bool,
    /// Penalty applied to repeated tokens.
    pub repetition_penalty: f64,
    /// Minimum number of tokens to generate.
    pub min_tokens_to_generate: u32,
}

impl GenerateRequest {
    /// Build a request with the fixed sampling parameters.
    pub fn new(prompt: String, max_tokens: u32) -> Self {
        Self {
            sentences: vec![prompt],
            tokens_to_generate: max_tokens,
            temperature: 0.15,
            add_bos: true,
            top_k: 0,
            top_p: 0.9,
            greedy: false,
            all_probs: false,
            repetition_penalty: 1.2,
            min_tokens_to_generate: 2,
        }
    }
}

/// Generate-style response body.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    /// Generated texts, each prefixed with the echoed prompt.
    pub sentences: Vec<String>,
}
