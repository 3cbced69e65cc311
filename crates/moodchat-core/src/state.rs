//! UI-agnostic conversation state
//!
//! These types are shared by every presentation layer and don't depend on
//! any UI framework. Mutation goes through [`crate::ConversationController`].

use serde::{Deserialize, Serialize};

/// Who wrote a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Label shown above the turn in the transcript
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }
}

/// One chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Everything a single chat widget remembers. Lives as long as the widget.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub(crate) transcript: Vec<Message>,
    pub(crate) session_id: Option<String>,
    pub(crate) pending_input: String,
    pub(crate) busy: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns in chronological order. Append-only.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// True exactly while a request is outstanding
    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
