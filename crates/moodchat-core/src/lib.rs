pub mod config;
pub mod controller;
pub mod error;
pub mod service;
pub mod state;

// Re-export main types for convenience
pub use config::{Config, DEFAULT_ENDPOINT};
pub use controller::{
    char_to_byte_index, ConversationController, SubmitKey, EXCHANGE_FAILED_REPLY,
    NO_RESPONSE_REPLY, REFOCUS_DELAY,
};
pub use error::ExchangeError;
pub use service::{ChatBackend, ChatRequest, ChatResponse, HttpChatClient};
pub use state::{ConversationState, Message, Sender};
