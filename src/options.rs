use crate::jsonrpc::VersionField;

/// Where the aria2 RPC endpoint lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ClientOptions {
    pub secure: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
    /// https://aria2.github.io/manual/en/html/aria2c.html#rpc-authorization-secret-token
    pub secret: String,
    pub version_field: VersionField,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            secure: false,
            host: "localhost".to_string(),
            port: 80,
            path: "/jsonrpc".to_string(),
            secret: String::new(),
            version_field: VersionField::Legacy,
        }
    }
}

impl ClientOptions {
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = path.into();
        self
    }

    pub fn secret<S: Into<String>>(mut self, secret: S) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn version_field(mut self, version_field: VersionField) -> Self {
        self.version_field = version_field;
        self
    }

    /// `base` gets an `s` appended when secure, e.g. `http` -> `https`.
    pub fn url(&self, base: &str) -> String {
        format!(
            "{}{}://{}:{}{}",
            base,
            if self.secure { "s" } else { "" },
            self.host,
            self.port,
            self.path
        )
    }

    pub fn http_url(&self) -> String {
        self.url("http")
    }

    pub fn ws_url(&self) -> String {
        self.url("ws")
    }

    /// secret with prefix, ready to be the first positional param of an aria2 method
    pub fn token(&self) -> Option<String> {
        if self.secret.is_empty() {
            None
        } else {
            Some(format!("token:{}", self.secret))
        }
    }
}
