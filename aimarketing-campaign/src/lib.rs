#![deny(missing_docs)]
//! # aimarketing-campaign
//!
//! Turns a contact list into one generated marketing email per contact.
//!
//! A [`Campaign`] picks which contacts it addresses and which system prompt
//! it uses. Each contact is rendered into a user prompt, sent through
//! [`aimarketing_llm::PromptClient`], and the reply is appended to a JSON
//! Lines file as an [`EmailRecord`].

pub mod batch;
pub mod campaign;
pub mod contact;
pub mod date;
pub mod display;
pub mod error;
pub mod system_prompt;

pub use batch::{BatchDriver, BatchReport, BatchReporter, EmailRecord};
pub use campaign::Campaign;
pub use contact::{Contact, format_user_prompt, load_contacts};
pub use date::humanize_date;
pub use display::TerminalReporter;
pub use error::CampaignError;
pub use system_prompt::SystemPromptCatalog;
