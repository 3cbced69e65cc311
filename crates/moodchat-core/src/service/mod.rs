//! Contract with the remote chat service

pub mod http;

pub use http::HttpChatClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;

/// Body of `POST <endpoint>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omitted until the service has issued one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Fields of the service reply that the client reads. Anything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Something that can carry one request/response exchange
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ExchangeError>;
}
