//! Errors for campaign loading and batch generation.

use std::path::PathBuf;

use aimarketing_llm::ClientError;
use thiserror::Error;

/// Errors from campaign setup and batch runs.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// No campaign has this display name.
    #[error("unknown campaign: {0:?}")]
    UnknownCampaign(String),

    /// The prompt catalog has no entry for the campaign.
    #[error("no system prompt for campaign {0:?}")]
    MissingSystemPrompt(String),

    /// A file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file held JSON that does not match the expected shape.
    #[error("{}:{line}: {source}", .path.display())]
    Parse {
        /// The file involved.
        path: PathBuf,
        /// 1-based line number; 0 when the whole document failed.
        line: usize,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The prompt client failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl CampaignError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_file_and_line() {
        let source = serde_json::from_str::<u32>("x").unwrap_err();
        let err = CampaignError::Parse {
            path: PathBuf::from("contacts.jsonl"),
            line: 3,
            source,
        };
        assert!(err.to_string().starts_with("contacts.jsonl:3: "));
    }

    #[test]
    fn client_errors_convert() {
        let err: CampaignError = ClientError::UnexpectedResponse("empty".into()).into();
        assert!(matches!(err, CampaignError::Client(_)));
        assert_eq!(err.to_string(), "unexpected response shape: empty");
    }
}
