//! Wire shapes of https://www.jsonrpc.org/specification as spoken by aria2 clients.

use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::deferred::Outcome;
use crate::error::{Error, RpcError};
use crate::Result;

/// Name of the protocol version member in outbound requests.
///
/// `Legacy` emits `"json-rpc"`, which is what existing aria2 front-ends send
/// and what aria2 accepts. `Canonical` emits `"jsonrpc"` for servers that
/// check the member strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionField {
    #[default]
    Legacy,
    Canonical,
}

impl VersionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionField::Legacy => "json-rpc",
            VersionField::Canonical => "jsonrpc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String, // A String containing the name of the method to be invoked.
    pub id: u64,
    pub params: Option<Value>, // Omitted entirely when absent; an empty array or object is kept.
    pub version_field: VersionField,
}

impl serde::Serialize for Request {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.params.is_some() { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("method", &self.method)?;
        map.serialize_entry(self.version_field.as_str(), "2.0")?;
        map.serialize_entry("id", &self.id)?;
        if let Some(ref params) = self.params {
            map.serialize_entry("params", params)?;
        }
        map.end()
    }
}

/// A transmitted payload: one request, or a batch sent as a JSON array.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Outbound {
    Single(Request),
    Batch(Vec<Request>),
}

impl Outbound {
    pub fn ids(&self) -> Vec<u64> {
        match self {
            Outbound::Single(req) => vec![req.id],
            Outbound::Batch(reqs) => reqs.iter().map(|r| r.id).collect(),
        }
    }

    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }
}

/// A request initiated by the server. Replying is up to the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRequest {
    pub id: Value,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Response { id: Value, outcome: Outcome },
    Notification { method: String, params: Option<Value> },
    Request(ServerRequest),
}

/// Sort one inbound element by which of `method` and `id` it carries.
pub fn classify(message: Value) -> Result<Inbound> {
    let Value::Object(mut object) = message else {
        return Err(Error::Malformed(message));
    };

    let method = match object.remove("method") {
        None => {
            let id = object.remove("id").unwrap_or(Value::Null);
            let outcome = match object.remove("error") {
                Some(error) if !is_falsy(&error) => Outcome::Error(RpcError::from_value(error)),
                _ => Outcome::Success(object.remove("result").unwrap_or(Value::Null)),
            };
            return Ok(Inbound::Response { id, outcome });
        }
        Some(Value::String(method)) => method,
        Some(other) => {
            object.insert("method".to_string(), other);
            return Err(Error::Malformed(Value::Object(object)));
        }
    };

    let params = object.remove("params");
    Ok(match object.remove("id") {
        None => Inbound::Notification { method, params },
        Some(id) => Inbound::Request(ServerRequest { id, method, params }),
    })
}

/// `null`, `false`, `0` and `""` in an `error` member mean no error.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Arrays are batches; anything else is a single element.
pub fn split(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(elements) => elements,
        single => vec![single],
    }
}
