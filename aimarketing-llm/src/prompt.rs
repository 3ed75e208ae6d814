//! The prompt pair submitted per request.

/// A system prompt and a user prompt, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    system: String,
    user: String,
}

impl PromptPair {
    /// Create a prompt pair.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// The system prompt.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The user prompt.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// System and user prompt separated by a blank line.
    ///
    /// This is the literal input of the generate-style endpoint.
    pub fn input_text(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}
