#![deny(missing_docs)]
//! Prompt submission client for marketing-email generation.
//!
//! Sends a system/user [`PromptPair`] to a language-model endpoint and returns
//! the reply with runs of blank lines collapsed. Two endpoint variants are
//! supported, chosen once from the configured URL:
//!
//! - OpenAI-compatible chat completions, streamed as server-sent events and
//!   retried with randomized exponential backoff;
//! - a generate-style endpoint (URL ending in `/generate`) answered in one
//!   response that echoes the prompt.
//!
//! Optional side effects: the growing reply is republished to a
//! [`ReplySink`], and each exchange is appended to a Markdown [`AuditLog`].

pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod retry;
pub mod sink;
pub mod streaming;
pub mod types;

pub use audit::AuditLog;
pub use client::{PromptClient, SubmitOptions};
pub use config::{BackendKind, ClientConfig};
pub use error::ClientError;
pub use normalize::normalize_reply;
pub use prompt::PromptPair;
pub use retry::RetryPolicy;
pub use sink::{NoopSink, ReplySink};
