//! Sales contacts and the user prompt rendered from each one.

use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::humanize_date;
use crate::error::CampaignError;

/// One row of the sales contact table.
///
/// Field names follow the table's upper-case column names on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Contact {
    /// Unique contact id.
    pub uid: u64,
    /// Company the contact works for.
    pub company_name: String,
    /// Person to address.
    pub contact_name: String,
    /// Where the email goes.
    pub contact_email: String,
    /// The company's industry.
    pub industry: String,
    /// Event the contact attended before, if any.
    #[serde(default)]
    pub previous_event: Option<String>,
    /// When that event took place.
    #[serde(default)]
    pub previous_event_date: Option<NaiveDate>,
    /// Free-form sales notes.
    #[serde(default)]
    pub notes: String,
}

impl Contact {
    /// The previous event, when one is on record and non-empty.
    ///
    /// An empty `PREVIOUS_EVENT` is treated the same as a missing one, so
    /// such a contact belongs to the New Customer campaign and its prompt
    /// carries no event lines.
    pub fn previous_event(&self) -> Option<&str> {
        self.previous_event.as_deref().filter(|e| !e.is_empty())
    }

    /// Whether the contact attended a previous event.
    pub fn has_previous_event(&self) -> bool {
        self.previous_event().is_some()
    }
}

/// Render the user prompt for `contact` as of `today`.
///
/// Every line ends in `\n`. The two previous-event lines appear only when
/// the contact has a previous event. The event date is given relative to
/// `today` (see [`humanize_date`]); a missing date renders as `None`.
pub fn format_user_prompt(contact: &Contact, today: NaiveDate) -> String {
    let mut prompt = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "COMPANY: {}", contact.company_name);
    let _ = writeln!(prompt, "INDUSTRY: {}", contact.industry);
    let _ = writeln!(prompt, "NOTES: {}", contact.notes);
    let _ = writeln!(prompt, "CONTACT_NAME: {}", contact.contact_name);
    if let Some(event) = contact.previous_event() {
        let _ = writeln!(prompt, "PREVIOUS_EVENT: {event}");
        match contact.previous_event_date {
            Some(date) => {
                let _ = writeln!(prompt, "PREVIOUS_EVENT_DATE: {}", humanize_date(date, today));
            }
            None => prompt.push_str("PREVIOUS_EVENT_DATE: None\n"),
        }
    }
    prompt
}

/// Load contacts from a JSON Lines file.
///
/// Blank lines are skipped. A line that does not parse fails the whole load
/// with its 1-based line number.
pub async fn load_contacts(path: impl AsRef<Path>) -> Result<Vec<Contact>, CampaignError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CampaignError::io(path, e))?;
    let contacts = parse_contacts(path, &text)?;
    tracing::debug!(path = %path.display(), count = contacts.len(), "loaded contacts");
    Ok(contacts)
}

fn parse_contacts(path: &Path, text: &str) -> Result<Vec<Contact>, CampaignError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| CampaignError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}
