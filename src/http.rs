use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::Result;

/// Sends one request body and hands back the response body.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, url: &str, body: String) -> Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, url: &str, body: String) -> Result<String> {
        // aria2 reports rpc errors with non-2xx codes and a json body, so the status is not checked
        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        tracing::trace!(status = %response.status(), "http response");
        Ok(response.text().await?)
    }
}
