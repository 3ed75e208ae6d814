//! Terminal rendering of batch progress and streamed replies.

use std::io::{self, Write};

use aimarketing_llm::{ClientError, ReplySink};

use crate::batch::{BatchReporter, EmailRecord, NOT_CONFIGURED};
use crate::contact::Contact;

/// Writes prompts, growing replies and progress to a terminal.
///
/// Each publish carries the whole normalized reply; only the part not yet
/// shown is written. If a republished reply no longer extends what is on
/// screen, it is printed again in full on a fresh line.
pub struct TerminalReporter<W = io::Stdout> {
    out: W,
    shown: String,
}

impl TerminalReporter<io::Stdout> {
    /// A reporter on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalReporter<W> {
    /// A reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
        }
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "terminal write failed");
        }
    }
}

impl<W: Write> ReplySink for TerminalReporter<W> {
    fn publish(&mut self, reply: &str) {
        match reply.strip_prefix(self.shown.as_str()) {
            Some(tail) => self.emit(tail),
            None => {
                self.emit("\n");
                self.emit(reply);
            }
        }
        self.shown.clear();
        self.shown.push_str(reply);
    }
}

impl<W: Write> BatchReporter for TerminalReporter<W> {
    fn contact_started(&mut self, index: usize, total: usize, contact: &Contact, user_prompt: &str) {
        self.shown.clear();
        let mut text = format!(
            "[{index}/{total}] {} <{}>\n",
            contact.company_name, contact.contact_email
        );
        for line in user_prompt.lines() {
            text.push_str("> ");
            text.push_str(line);
            text.push('\n');
        }
        text.push('\n');
        self.emit(&text);
    }

    fn reply_sink(&mut self) -> &mut dyn ReplySink {
        self
    }

    fn record_written(&mut self, index: usize, total: usize, record: &EmailRecord) {
        if self.shown.is_empty() {
            // Nothing was streamed; show the final email once.
            self.emit(&record.email);
        }
        let line = format!("\n\nwrote email for uid {} ({index}/{total})\n\n", record.uid);
        self.emit(&line);
    }

    fn not_configured(&mut self, error: &ClientError) {
        tracing::debug!(error = %error, "reporting submission failure");
        self.emit(&format!("\n{NOT_CONFIGURED}\n"));
    }
}
