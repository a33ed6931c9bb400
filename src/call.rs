use serde_json::Value;

use crate::error::Error;

/// One method invocation, before it is given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub params: Option<Value>,
}

impl Call {
    pub fn new<S: Into<String>>(method: S) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn maybe_params(mut self, params: Option<Value>) -> Self {
        self.params = params;
        self
    }
}

impl<S: Into<String>> From<(S, Value)> for Call {
    fn from((method, params): (S, Value)) -> Self {
        Call::new(method).params(params)
    }
}

impl<S: Into<String>> From<(S, Option<Value>)> for Call {
    fn from((method, params): (S, Option<Value>)) -> Self {
        Call::new(method).maybe_params(params)
    }
}

impl From<&str> for Call {
    fn from(method: &str) -> Self {
        Call::new(method)
    }
}

/// Accepts `["method", params?]` or `{"method": ..., "params": ...}`.
impl TryFrom<Value> for Call {
    type Error = Error;

    fn try_from(entry: Value) -> Result<Self, Self::Error> {
        let (method, params) = match entry {
            Value::Array(items) => {
                let mut items = items.into_iter();
                (items.next().unwrap_or(Value::Null), items.next())
            }
            Value::Object(mut object) => (
                object.remove("method").unwrap_or(Value::Null),
                object.remove("params"),
            ),
            other => (other, None),
        };
        match method {
            Value::String(method) => Ok(Call::new(method).maybe_params(params)),
            other => Err(Error::InvalidMethodType(other)),
        }
    }
}
