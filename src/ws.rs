use std::pin::Pin;
use std::sync::Weak;

use futures_util::{future, Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite;

use crate::client::ClientInner;
use crate::error::Error;
use crate::Result;

type WSMessage = tokio_tungstenite::tungstenite::Message;

/// Write half of an open socket; accepts text frames.
pub type SocketSink = Pin<Box<dyn Sink<String, Error = Error> + Send>>;
/// Read half of an open socket.
pub type SocketStream = Pin<Box<dyn Stream<Item = Result<SocketEvent>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Text(String),
    Close,
}

/// Opens a duplex text stream to `url`. Returns once the socket is ready.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(SocketSink, SocketStream)>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait::async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<(SocketSink, SocketStream)> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(Error::Connect)?;
        let (ws_tx, ws_rx) = ws.split();

        let sink = ws_tx
            .sink_map_err(Error::Websocket)
            .with(|text: String| future::ready(Ok::<_, Error>(WSMessage::Text(text.into()))));
        let stream = ws_rx.filter_map(|msg| {
            future::ready(match msg {
                Ok(WSMessage::Text(text)) => Some(Ok(SocketEvent::Text(text.as_str().to_owned()))),
                Ok(WSMessage::Close(_)) => Some(Ok(SocketEvent::Close)),
                Ok(_) => None,
                Err(tungstenite::Error::ConnectionClosed) => Some(Ok(SocketEvent::Close)),
                Err(e) => Some(Err(Error::Websocket(e))),
            })
        });
        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

/// Feeds inbound frames to the client until the socket closes or fails.
pub(crate) async fn background(inner: Weak<ClientInner>, mut stream: SocketStream) {
    while let Some(event) = stream.next().await {
        let Some(inner) = inner.upgrade() else {
            tracing::info!("client dropped, background task shutdown");
            return;
        };
        match event {
            Ok(SocketEvent::Text(text)) => inner.dispatch_text(&text),
            Ok(SocketEvent::Close) => {
                tracing::info!("websocket closed");
                break;
            }
            Err(e) => {
                tracing::error!("websocket error: {e}");
                inner.socket_failed(e).await;
                return;
            }
        }
    }
    if let Some(inner) = inner.upgrade() {
        inner.socket_closed().await;
    }
}
