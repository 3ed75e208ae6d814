//! Basic usage of the prompt client.
//!
//! Point `LLM_URL` at an OpenAI-compatible chat endpoint (or a `/generate`
//! endpoint) and run:
//!   cargo run --example basic -p aimarketing-llm

use std::io::Write;

use aimarketing_llm::{PromptClient, PromptPair, SubmitOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = PromptClient::from_env()?;

    let prompt = PromptPair::new(
        "You are a marketing assistant. Write a two-sentence email.",
        "COMPANY: Acme Tools\nINDUSTRY: Hardware\nNOTES: Visited our booth\nCONTACT_NAME: Ana\n",
    );

    let mut shown = 0;
    let mut sink = |reply: &str| {
        // Replies only grow, so print the new tail.
        let _ = write!(std::io::stdout(), "{}", &reply[shown..]);
        let _ = std::io::stdout().flush();
        shown = reply.len();
    };
    let options = SubmitOptions {
        incremental: true,
        audit: false,
    };
    let reply = client.submit(&prompt, options, &mut sink).await?;
    println!();
    println!("({} characters)", reply.chars().count());

    Ok(())
}
