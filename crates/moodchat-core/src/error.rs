use thiserror::Error;

/// Why an exchange with the chat service failed.
///
/// The transcript never tells these apart; the variant only reaches the log.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("chat service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("chat service returned a malformed body: {0}")]
    Decode(#[from] serde_json::Error),
}
