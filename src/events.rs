use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Error;
use crate::jsonrpc::{Outbound, ServerRequest};

/// Everything observable on a client.
#[derive(Debug, Clone)]
pub enum Event {
    /// A payload about to be transmitted.
    Output(Outbound),
    /// A decoded payload about to be dispatched.
    Input(Value),
    Open,
    Close,
    /// Decode, socket and other failures that belong to no single call.
    Error(Arc<Error>),
    Notification { method: String, params: Option<Value> },
}

pub type RequestHandler = Box<dyn Fn(ServerRequest) + Send + Sync>;

/// Listeners for events, per-method notification listeners, and the server request hook.
#[derive(Default)]
pub(crate) struct Subscribers {
    listeners: Mutex<Vec<mpsc::UnboundedSender<Event>>>,
    notifications: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Option<Value>>>>>,
    request_handler: Mutex<Option<Arc<RequestHandler>>>,
}

impl Subscribers {
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().push(tx);
        rx
    }

    pub fn subscribe_notification(&self, method: &str) -> mpsc::UnboundedReceiver<Option<Value>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.notifications
            .lock()
            .entry(method.to_string())
            .or_default()
            .push(tx);
        rx
    }

    pub fn set_request_handler(&self, handler: RequestHandler) {
        *self.request_handler.lock() = Some(Arc::new(handler));
    }

    pub fn emit(&self, event: Event) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn emit_error(&self, err: Error) {
        self.emit(Event::Error(Arc::new(err)));
    }

    pub fn notify(&self, method: String, params: Option<Value>) {
        {
            let mut notifications = self.notifications.lock();
            if let Some(senders) = notifications.get_mut(&method) {
                senders.retain(|tx| tx.send(params.clone()).is_ok());
                if senders.is_empty() {
                    notifications.remove(&method);
                }
            }
        }
        self.emit(Event::Notification { method, params });
    }

    /// Returns false when nobody handles server requests.
    pub fn request(&self, request: ServerRequest) -> bool {
        // released before the handler runs, so it may install another one
        let handler = self.request_handler.lock().clone();
        match handler {
            Some(handler) => {
                handler(request);
                true
            }
            None => false,
        }
    }
}
