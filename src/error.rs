use crate::client::ConnectionState;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Rpc error {0}")]
    Rpc(RpcError),
    #[error("Invalid method type: {0} is not a string")]
    InvalidMethodType(serde_json::Value),
    #[error("Malformed message {0}")]
    Malformed(serde_json::Value),
    #[error("Decode error {0}")]
    Decode(serde_json::Error),
    #[error("Encode error {0}")]
    Encode(serde_json::Error),
    #[error("Connect error {0}")]
    Connect(tokio_tungstenite::tungstenite::Error),
    #[error("Http error {0}")]
    Http(#[from] reqwest::Error),
    #[error("Websocket error {0}")]
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Transport error {0}")]
    Transport(String),
    #[error("Call cancelled before a response arrived")]
    Cancelled,
    #[error("Connection is {0}")]
    InvalidState(ConnectionState),
}

/// The `error` member of a JSON-RPC response.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    /// Servers are free to put anything in `error`; non-conforming payloads are kept in `data`.
    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value::<RpcError>(value.clone()) {
            Ok(err) => err,
            Err(_) => RpcError {
                code: 0,
                message: value.to_string(),
                data: Some(value),
            },
        }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RpcError: {{\"code\": {}, \"message\": \"{}\"}}",
            self.code, self.message
        )
    }
}
impl std::error::Error for RpcError {}

impl From<RpcError> for Error {
    fn from(err: RpcError) -> Self {
        Error::Rpc(err)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}
