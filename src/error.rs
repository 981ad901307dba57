use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised by the live client.
///
/// None of these ever escape the connection supervisor: they are logged,
/// passed to the caller's optional error handler and then handed to the
/// reconnect policy.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("failed to decode frame: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid frame payload: {0}")]
    InvalidFrame(#[from] base64::DecodeError),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
