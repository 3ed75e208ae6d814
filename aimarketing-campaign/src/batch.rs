//! Sequential email generation over a campaign's contacts.

use std::path::{Path, PathBuf};

use aimarketing_llm::{ClientError, PromptClient, PromptPair, ReplySink, SubmitOptions};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::campaign::Campaign;
use crate::contact::{Contact, format_user_prompt};
use crate::error::CampaignError;

/// Shown to the operator when a prompt submission fails.
pub const NOT_CONFIGURED: &str = "LLM API not configured.";

/// One generated email, as appended to the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EmailRecord {
    /// Shared by every record of one batch run.
    pub session_id: String,
    /// The contact's id.
    pub uid: u64,
    /// The contact's email address.
    pub contact_email: String,
    /// Display name of the campaign.
    pub campaign_name: String,
    /// System prompt sent with the request.
    pub system_prompt: String,
    /// User prompt rendered from the contact.
    pub user_prompt: String,
    /// The generated email.
    pub email: String,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
}

/// Receives progress from a [`BatchDriver`] run.
pub trait BatchReporter {
    /// Contact `index` (1-based) of `total` is about to be submitted.
    fn contact_started(&mut self, index: usize, total: usize, contact: &Contact, user_prompt: &str);

    /// Where the growing reply for the current contact is published.
    fn reply_sink(&mut self) -> &mut dyn ReplySink;

    /// The record for contact `index` of `total` has been written.
    fn record_written(&mut self, index: usize, total: usize, record: &EmailRecord);

    /// Submission failed; the batch stops after this call.
    fn not_configured(&mut self, error: &ClientError);
}

/// Summary of a finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Session id stamped on every record.
    pub session_id: Uuid,
    /// Number of records appended to the output file.
    pub written: usize,
}

/// Generates one email per selected contact, one request at a time.
pub struct BatchDriver<'a> {
    client: &'a PromptClient,
    output: PathBuf,
    options: SubmitOptions,
    today: Option<NaiveDate>,
}

impl<'a> BatchDriver<'a> {
    /// A driver appending records to `output`.
    pub fn new(client: &'a PromptClient, output: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output: output.into(),
            options: SubmitOptions::default(),
            today: None,
        }
    }

    /// Override the per-request options.
    #[must_use]
    pub fn options(mut self, options: SubmitOptions) -> Self {
        self.options = options;
        self
    }

    /// Render event dates relative to `today` instead of the local date.
    #[must_use]
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// The output file.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Run `campaign` over `contacts`, optionally restricted to one `uid`.
    ///
    /// Stops at the first client failure. Records written before it stay in
    /// the output file, and the failure is returned.
    pub async fn run(
        &self,
        campaign: Campaign,
        system_prompt: &str,
        contacts: &[Contact],
        uid: Option<u64>,
        reporter: &mut dyn BatchReporter,
    ) -> Result<BatchReport, CampaignError> {
        let selected: Vec<&Contact> = campaign
            .select(contacts)
            .filter(|c| uid.is_none_or(|uid| c.uid == uid))
            .collect();
        let total = selected.len();
        let session_id = Uuid::new_v4();
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());

        if total == 0 {
            tracing::warn!(campaign = %campaign, ?uid, "no contacts selected");
        } else {
            tracing::info!(campaign = %campaign, %session_id, contacts = total, "starting batch");
        }

        let mut written = 0;
        for (i, contact) in selected.into_iter().enumerate() {
            let index = i + 1;
            let user_prompt = format_user_prompt(contact, today);
            tracing::debug!(uid = contact.uid, index, total, "rendered user prompt");
            reporter.contact_started(index, total, contact, &user_prompt);

            let prompt = PromptPair::new(system_prompt, user_prompt);
            let email = match self.client.submit(&prompt, self.options, reporter.reply_sink()).await {
                Ok(email) => email,
                Err(err) => {
                    tracing::error!(uid = contact.uid, error = %err, written, "prompt submission failed, stopping batch");
                    reporter.not_configured(&err);
                    return Err(err.into());
                }
            };

            let record = EmailRecord {
                session_id: session_id.to_string(),
                uid: contact.uid,
                contact_email: contact.contact_email.clone(),
                campaign_name: campaign.name().to_string(),
                system_prompt: prompt.system().to_string(),
                user_prompt: prompt.user().to_string(),
                email,
                timestamp: Utc::now(),
            };
            append_record(&self.output, &record).await?;
            written += 1;
            reporter.record_written(index, total, &record);
        }

        tracing::info!(%session_id, written, output = %self.output.display(), "batch finished");
        Ok(BatchReport { session_id, written })
    }
}

/// Append `record` as one JSON line, creating parent directories if needed.
pub async fn append_record(path: &Path, record: &EmailRecord) -> Result<(), CampaignError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CampaignError::io(parent, e))?;
    }

    let mut line = serde_json::to_string(record).map_err(|source| CampaignError::Parse {
        path: path.to_path_buf(),
        line: 0,
        source,
    })?;
    line.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| CampaignError::io(path, e))?;
    file.write_all(line.as_bytes())
        .await
        .map_err(|e| CampaignError::io(path, e))?;
    file.flush().await.map_err(|e| CampaignError::io(path, e))?;
    Ok(())
}
