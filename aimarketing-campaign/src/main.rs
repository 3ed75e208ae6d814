//! `aimarketing`: generate campaign emails for a contact list.

use std::path::PathBuf;
use std::process::ExitCode;

use aimarketing_campaign::{
    BatchDriver, Campaign, CampaignError, SystemPromptCatalog, TerminalReporter, load_contacts,
};
use aimarketing_llm::{PromptClient, SubmitOptions};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Generate one marketing email per contact with an LLM endpoint.
///
/// The endpoint is configured through LLM_URL, LLM_MODEL, LLM_MAX_TOKENS,
/// LLM_STREAM and LLM_AUDIT_LOG.
#[derive(Parser, Debug)]
#[command(name = "aimarketing", version, about)]
struct Cli {
    /// Campaign to run, by display name (e.g. "Returning Customer")
    #[arg(long, value_name = "NAME", required_unless_present = "list_campaigns")]
    campaign: Option<String>,

    /// Contacts, one JSON object per line
    #[arg(long, value_name = "FILE", default_value = "contacts.jsonl")]
    contacts: PathBuf,

    /// System prompt catalog
    #[arg(long, value_name = "FILE", default_value = "extraordinary_events.json")]
    prompts: PathBuf,

    /// Only generate for the contact with this uid
    #[arg(long)]
    uid: Option<u64>,

    /// Where generated emails are appended
    #[arg(long, value_name = "FILE", default_value = "gpt_email_prompts.jsonl")]
    output: PathBuf,

    /// Do not append exchanges to the audit log
    #[arg(long)]
    no_audit: bool,

    /// Print each email once it is complete instead of while it streams
    #[arg(long)]
    quiet: bool,

    /// Print the campaign names and exit
    #[arg(long)]
    list_campaigns: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CampaignError> {
    if cli.list_campaigns {
        for campaign in Campaign::all() {
            println!("{campaign}");
        }
        return Ok(());
    }

    let name = cli.campaign.as_deref().unwrap_or_default();
    let campaign = Campaign::from_name(name)?;
    let system_prompt = SystemPromptCatalog::load(&cli.prompts)
        .await?
        .prompt_for(campaign)?;
    let contacts = load_contacts(&cli.contacts).await?;

    let client = PromptClient::from_env()?;
    let options = SubmitOptions {
        incremental: !cli.quiet,
        audit: !cli.no_audit,
    };
    let driver = BatchDriver::new(&client, &cli.output).options(options);

    let mut reporter = TerminalReporter::stdout();
    let report = driver
        .run(campaign, &system_prompt, &contacts, cli.uid, &mut reporter)
        .await?;

    println!(
        "Wrote {} rows to `{}` (session {})",
        report.written,
        driver.output().display(),
        report.session_id
    );
    Ok(())
}
