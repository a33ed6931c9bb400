use std::ops::Deref;
use std::sync::Arc;

use futures_util::SinkExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::call::Call;
use crate::correlation::Correlation;
use crate::deferred::{Outcome, PendingCall};
use crate::error::Error;
use crate::events::{Event, Subscribers};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::jsonrpc::{self, Inbound, Outbound, Request, ServerRequest};
use crate::options::ClientOptions;
use crate::ws::{self, Connector, SocketSink, TungsteniteConnector};
use crate::Result;

/// WebSocket lifecycle. HTTP needs no connection and is used whenever this is not `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Opening,
    Open,
    Closing,
    /// The socket failed. Terminal; build a new client to reconnect.
    Errored,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            ConnectionState::Closed => "closed",
            ConnectionState::Opening => "opening",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Errored => "errored",
        };
        f.write_str(state)
    }
}

pub struct ClientBuilder {
    options: ClientOptions,
    http: Option<Arc<dyn HttpTransport>>,
    connector: Option<Arc<dyn Connector>>,
}

impl ClientBuilder {
    pub fn http<T: HttpTransport + 'static>(mut self, http: T) -> Self {
        self.http = Some(Arc::new(http));
        self
    }

    pub fn connector<C: Connector + 'static>(mut self, connector: C) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    pub fn build(self) -> Client {
        let http = self
            .http
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()));
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(TungsteniteConnector));
        Client {
            inner: Arc::new(ClientInner {
                options: self.options,
                http,
                connector,
                table: Mutex::new(Correlation::new()),
                events: Subscribers::default(),
                state: Mutex::new(ConnectionState::Closed),
                writer: tokio::sync::Mutex::new(None),
                reader: Mutex::new(None),
            }),
        }
    }
}

/// JSON-RPC client for an aria2 endpoint.
///
/// Requests go over HTTP until [`open`](Client::open) succeeds, then over the
/// WebSocket until it closes. Cloning is cheap and clones share every pending
/// call and subscription.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Deref for Client {
    type Target = ClientInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Client {
    pub fn new(options: ClientOptions) -> Self {
        Self::builder(options).build()
    }

    pub fn builder(options: ClientOptions) -> ClientBuilder {
        ClientBuilder {
            options,
            http: None,
            connector: None,
        }
    }

    /// Connect the WebSocket and wait until it is ready.
    pub async fn open(&self) -> Result<()> {
        self.transition(ConnectionState::Closed, ConnectionState::Opening)?;
        let url = self.options.ws_url();
        tracing::info!("connecting to {url}");

        let (sink, stream) = match self.connector.connect(&url).await {
            Ok(socket) => socket,
            Err(e) => {
                tracing::error!("connect error: {e}");
                self.set_state(ConnectionState::Errored);
                return Err(e);
            }
        };

        *self.writer.lock().await = Some(sink);
        self.set_state(ConnectionState::Open);
        let reader = tokio::spawn(ws::background(Arc::downgrade(&self.inner), stream));
        *self.reader.lock() = Some(reader);
        self.events.emit(Event::Open);
        Ok(())
    }

    /// Ask the server to close the WebSocket and wait until it has.
    pub async fn close(&self) -> Result<()> {
        self.transition(ConnectionState::Open, ConnectionState::Closing)?;

        let closed = match self.writer.lock().await.as_mut() {
            Some(sink) => sink.close().await,
            None => Ok(()),
        };
        if let Err(e) = closed {
            tracing::error!("close error: {e}");
            self.set_state(ConnectionState::Errored);
            return Err(e);
        }

        let reader = self.reader.lock().take();
        if let Some(reader) = reader {
            if let Err(e) = reader.await {
                tracing::error!("background task failed: {e}");
            }
        }
        match self.state() {
            ConnectionState::Errored => Err(Error::InvalidState(ConnectionState::Errored)),
            _ => Ok(()),
        }
    }
}

pub struct ClientInner {
    options: ClientOptions,
    http: Arc<dyn HttpTransport>,
    connector: Arc<dyn Connector>,
    table: Mutex<Correlation>,
    events: Subscribers,
    state: Mutex<ConnectionState>,
    writer: tokio::sync::Mutex<Option<SocketSink>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.get_mut().take() {
            reader.abort();
        }
    }
}

impl ClientInner {
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Number of calls still waiting for a response.
    pub fn pending(&self) -> usize {
        self.table.lock().len()
    }

    /// Every event from now on: output, input, open, close, errors and notifications.
    pub fn events(&self) -> mpsc::UnboundedReceiver<Event> {
        self.events.subscribe()
    }

    /// The `params` of every notification named `method`, e.g. `aria2.onDownloadComplete`.
    pub fn on_notification(&self, method: &str) -> mpsc::UnboundedReceiver<Option<Value>> {
        self.events.subscribe_notification(method)
    }

    /// Install the hook for requests the server sends to us. Replaces any previous one.
    pub fn on_request<F>(&self, handler: F)
    where
        F: Fn(ServerRequest) + Send + Sync + 'static,
    {
        self.events.set_request_handler(Box::new(handler));
    }

    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value> {
        self.send(Call::new(method).maybe_params(params)).await?.await
    }

    pub async fn call_as<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T> {
        self.send(Call::new(method).maybe_params(params))
            .await?
            .into_result()
            .await
    }

    /// Transmit one call and return its pending result without waiting for it.
    pub async fn send<C>(&self, call: C) -> Result<PendingCall>
    where
        C: TryInto<Call>,
        Error: From<C::Error>,
    {
        let call = call.try_into()?;
        let (request, pending) = {
            let mut table = self.table.lock();
            let id = table.allocate();
            (self.request(call, id), table.register(id))
        };
        self.transmit(Outbound::Single(request)).await?;
        Ok(pending)
    }

    /// Transmit several calls as one array payload; results come back in input order.
    ///
    /// Every entry is validated before any id is allocated, so a bad entry
    /// fails the whole batch without consuming ids.
    pub async fn batch<I, C>(&self, calls: I) -> Result<Vec<PendingCall>>
    where
        I: IntoIterator<Item = C>,
        C: TryInto<Call>,
        Error: From<C::Error>,
    {
        let calls = calls
            .into_iter()
            .map(|call| call.try_into().map_err(Error::from))
            .collect::<Result<Vec<Call>>>()?;
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let (requests, pending): (Vec<_>, Vec<_>) = {
            let mut table = self.table.lock();
            calls
                .into_iter()
                .map(|call| {
                    let id = table.allocate();
                    (self.request(call, id), table.register(id))
                })
                .unzip()
        };
        self.transmit(Outbound::Batch(requests)).await?;
        Ok(pending)
    }

    /// Route a decoded inbound payload, single or batch.
    pub fn dispatch(&self, payload: Value) {
        self.events.emit(Event::Input(payload.clone()));
        for element in jsonrpc::split(payload) {
            match jsonrpc::classify(element) {
                Ok(Inbound::Response { id, outcome }) => self.on_response(id, outcome),
                Ok(Inbound::Notification { method, params }) => {
                    tracing::debug!("notification {method}");
                    self.events.notify(method, params);
                }
                Ok(Inbound::Request(request)) => {
                    let method = request.method.clone();
                    if !self.events.request(request) {
                        tracing::warn!("no handler for server request {method}");
                    }
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    self.events.emit_error(e);
                }
            }
        }
    }

    /// Decode and route a text payload. Undecodable text is reported as an error event.
    pub fn dispatch_text(&self, text: &str) {
        match serde_json::from_str::<Value>(text) {
            Ok(payload) => self.dispatch(payload),
            Err(e) => {
                tracing::warn!("decode error: {e}");
                self.events.emit_error(Error::Decode(e));
            }
        }
    }

    fn request(&self, call: Call, id: u64) -> Request {
        Request {
            method: call.method,
            id,
            params: call.params,
            version_field: self.options.version_field,
        }
    }

    fn on_response(&self, id: Value, outcome: Outcome) {
        let completed = match id.as_u64() {
            Some(id) => self.table.lock().complete(id, outcome),
            None => false,
        };
        if !completed {
            tracing::debug!("discarding response for unknown id {id}");
        }
    }

    async fn transmit(&self, outbound: Outbound) -> Result<()> {
        let text = outbound.to_text();
        let ids = outbound.ids();
        self.events.emit(Event::Output(outbound));

        let sent = match text {
            Ok(text) => self.write(text).await,
            Err(e) => Err(e),
        };
        if sent.is_err() {
            let mut table = self.table.lock();
            for id in ids {
                table.cancel(id);
            }
        }
        sent
    }

    async fn write(&self, text: String) -> Result<()> {
        if self.state() == ConnectionState::Open {
            let mut writer = self.writer.lock().await;
            if let Some(sink) = writer.as_mut() {
                let sent = sink.send(text).await;
                if let Err(ref e) = sent {
                    tracing::error!("websocket write error: {e}");
                    writer.take();
                    self.set_state(ConnectionState::Errored);
                    if let Some(reader) = self.reader.lock().take() {
                        reader.abort();
                    }
                    self.events.emit_error(Error::Transport(e.to_string()));
                }
                return sent;
            }
        }
        let body = self.http.post(&self.options.http_url(), text).await?;
        self.dispatch_text(&body);
        Ok(())
    }

    fn transition(&self, from: ConnectionState, to: ConnectionState) -> Result<()> {
        let mut state = self.state.lock();
        if *state != from {
            return Err(Error::InvalidState(*state));
        }
        *state = to;
        Ok(())
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }

    pub(crate) async fn socket_closed(&self) {
        self.writer.lock().await.take();
        {
            let mut state = self.state.lock();
            if *state != ConnectionState::Errored {
                *state = ConnectionState::Closed;
            }
        }
        self.events.emit(Event::Close);
    }

    pub(crate) async fn socket_failed(&self, err: Error) {
        self.writer.lock().await.take();
        self.set_state(ConnectionState::Errored);
        self.events.emit_error(err);
    }
}
