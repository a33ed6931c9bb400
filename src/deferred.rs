use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{Error, RpcError};
use crate::Result;

/// How a pending call settles.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(serde_json::Value),
    Error(RpcError),
}

/// Completion side of a pending call. Consumed by the first completion.
#[derive(Debug)]
pub struct Deferred {
    handler: oneshot::Sender<Outcome>,
}

impl Deferred {
    pub fn new(id: u64) -> (Self, PendingCall) {
        let (handler, rx) = oneshot::channel();
        (Self { handler }, PendingCall { id, rx })
    }

    pub fn complete(self, outcome: Outcome) {
        // the caller may have dropped its PendingCall already
        let _ = self.handler.send(outcome);
    }

    pub fn resolve(self, value: serde_json::Value) {
        self.complete(Outcome::Success(value))
    }

    pub fn reject(self, err: RpcError) {
        self.complete(Outcome::Error(err))
    }
}

/// The caller's handle on an issued request.
///
/// Resolves to the response `result`, or to [`Error::Rpc`] when the server
/// answered with an `error`. A call that never gets a response stays
/// pending; wrap it in [`tokio::time::timeout`] to bound the wait.
#[derive(Debug)]
#[must_use = "a pending call does nothing unless awaited"]
pub struct PendingCall {
    id: u64,
    rx: oneshot::Receiver<Outcome>,
}

impl PendingCall {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Await the result and decode it into `T`.
    pub async fn into_result<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        let value = self.await?;
        serde_json::from_value(value).map_err(Error::Decode)
    }
}

impl Future for PendingCall {
    type Output = Result<serde_json::Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(Outcome::Success(value))) => Poll::Ready(Ok(value)),
            Poll::Ready(Ok(Outcome::Error(err))) => Poll::Ready(Err(err.into())),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Cancelled)),
        }
    }
}
