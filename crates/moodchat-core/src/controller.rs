//! Conversation state machine
//!
//! Two states: idle and awaiting a reply. [`ConversationController::begin_submit`]
//! moves idle to awaiting, [`ConversationController::settle`] moves back. The
//! network call sits between them so an event loop can run it on its own task;
//! [`ConversationController::submit`] joins the halves for callers that can await inline.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::ExchangeError;
use crate::service::{ChatBackend, ChatRequest, ChatResponse};
use crate::state::{ConversationState, Message};

/// Bot text used when the service replies without a `response`
pub const NO_RESPONSE_REPLY: &str = "No response";

/// Bot text used for every failed exchange
pub const EXCHANGE_FAILED_REPLY: &str = "Error connecting to backend.";

/// How long a UI should wait after settlement before refocusing the input
pub const REFOCUS_DELAY: Duration = Duration::from_millis(100);

/// A commit-style keystroke in the draft editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKey {
    /// Plain Enter: send the draft
    Commit,
    /// Enter with a newline modifier: insert `\n` at this char index
    Newline { cursor: usize },
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Default)]
pub struct ConversationController {
    state: ConversationState,
}

impl ConversationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[Message] {
        self.state.transcript()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.state.session_id()
    }

    pub fn draft(&self) -> &str {
        self.state.pending_input()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Whether a commit right now would be accepted
    pub fn can_send(&self) -> bool {
        !self.state.busy && !self.state.pending_input.trim().is_empty()
    }

    /// Replace the draft. Allowed while busy.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.state.pending_input = text.into();
    }

    /// Accept `text` as the next user turn and build the request for it.
    ///
    /// Returns `None` without touching state when `text` is blank or an
    /// exchange is already outstanding. The message is sent untrimmed.
    pub fn begin_submit(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() || self.state.busy {
            return None;
        }

        self.state.transcript.push(Message::user(text));
        self.state.pending_input.clear();
        self.state.busy = true;

        let request = ChatRequest {
            message: text.to_string(),
            session_id: self.state.session_id.clone(),
        };
        debug!(
            has_session = request.session_id.is_some(),
            "dispatching chat request"
        );
        Some(request)
    }

    /// Apply the outcome of the outstanding exchange and return the bot turn it produced.
    ///
    /// Ignored when nothing is outstanding, so each accepted send gets exactly one reply.
    pub fn settle(&mut self, outcome: Result<ChatResponse, ExchangeError>) -> Option<&Message> {
        if !self.state.busy {
            warn!("ignoring chat outcome with no exchange outstanding");
            return None;
        }

        let reply = match outcome {
            Ok(body) => {
                if self.state.session_id.is_none() {
                    if let Some(id) = body.session_id.filter(|id| !id.is_empty()) {
                        info!(session_id = %id, "adopted chat session");
                        self.state.session_id = Some(id);
                    }
                }
                body.response
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| NO_RESPONSE_REPLY.to_string())
            }
            Err(err) => {
                warn!(error = %err, "chat exchange failed");
                EXCHANGE_FAILED_REPLY.to_string()
            }
        };

        self.state.transcript.push(Message::bot(reply));
        self.state.busy = false;
        self.state.transcript.last()
    }

    /// Run a whole exchange against `backend`. Returns false if the send was rejected.
    pub async fn submit<B>(&mut self, text: &str, backend: &B) -> bool
    where
        B: ChatBackend + ?Sized,
    {
        let Some(request) = self.begin_submit(text) else {
            return false;
        };
        let outcome = backend.send(request).await;
        self.settle(outcome);
        true
    }

    /// Interpret Enter in the draft editor. Returns the request to send, if any.
    pub fn on_submit_key(&mut self, key: SubmitKey) -> Option<ChatRequest> {
        match key {
            SubmitKey::Commit => {
                let draft = self.state.pending_input.clone();
                self.begin_submit(&draft)
            }
            SubmitKey::Newline { cursor } => {
                let byte_pos = char_to_byte_index(&self.state.pending_input, cursor);
                self.state.pending_input.insert(byte_pos, '\n');
                None
            }
        }
    }
}
