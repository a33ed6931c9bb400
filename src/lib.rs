//! JSON-RPC 2.0 client for aria2, over HTTP or a WebSocket.
//!
//! ```no_run
//! use aria2_jsonrpc::{Client, ClientOptions, Result};
//!
//! # async fn run() -> Result<()> {
//! let client = Client::new(ClientOptions::new("localhost", 6800));
//! let version = client.call("aria2.getVersion", None).await?;
//!
//! client.open().await?;
//! let mut complete = client.on_notification("aria2.onDownloadComplete");
//! let stats = client.call("aria2.getGlobalStat", None).await?;
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod call;
mod client;
mod correlation;
mod deferred;
mod error;
mod events;
pub mod http;
pub mod jsonrpc;
mod options;
pub mod ws;

pub use call::Call;
pub use client::{Client, ClientBuilder, ClientInner, ConnectionState};
pub use correlation::Correlation;
pub use deferred::{Deferred, Outcome, PendingCall};
pub use error::{Error, RpcError};
pub use events::{Event, RequestHandler};
pub use jsonrpc::{ServerRequest, VersionField};
pub use options::ClientOptions;

pub type Result<T> = std::result::Result<T, Error>;
