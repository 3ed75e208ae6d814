//! Campaign system prompts loaded from a JSON catalog.
//!
//! The catalog looks like `{"system_prompt": {"<campaign name>": "<prompt>"}}`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::campaign::Campaign;
use crate::error::CampaignError;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    system_prompt: HashMap<String, String>,
}

/// System prompts keyed by campaign name.
#[derive(Debug, Clone, Default)]
pub struct SystemPromptCatalog {
    prompts: HashMap<String, String>,
}

impl SystemPromptCatalog {
    /// Read and parse the catalog at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CampaignError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CampaignError::io(path, e))?;
        Self::parse(&text).map_err(|source| CampaignError::Parse {
            path: path.to_path_buf(),
            line: 0,
            source,
        })
    }

    /// Parse a catalog document.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Ok(Self {
            prompts: file.system_prompt,
        })
    }

    /// The prompt for `campaign`, with each line trimmed of spaces and tabs.
    pub fn prompt_for(&self, campaign: Campaign) -> Result<String, CampaignError> {
        self.prompts
            .get(campaign.name())
            .map(|p| trim_lines(p))
            .ok_or_else(|| CampaignError::MissingSystemPrompt(campaign.name().to_string()))
    }
}

/// Strip leading and trailing spaces and tabs from every line.
pub(crate) fn trim_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| line.trim_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}
