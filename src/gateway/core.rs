//! Shared HTTP plumbing embedded by both venue gateways (composition, not
//! inheritance): lazy session creation, URL building, limiter selection.

use std::collections::HashMap;

use tokio::sync::OnceCell;

use super::{GatewaySettings, Method};
use crate::errors::{Error, Result};
use crate::ratelimit::TokenBucket;

const USER_AGENT: &str = "kimchi-arb/0.1";

/// Reusable building blocks for a venue's [`super::Gateway`] impl. Each
/// venue struct holds one of these and forwards to it, adding only its own
/// signing and body-encoding quirks.
pub struct HttpCore {
    pub settings: GatewaySettings,
    pub public_limiter: Option<TokenBucket>,
    pub private_limiter: Option<TokenBucket>,
    client: OnceCell<reqwest::Client>,
}

impl HttpCore {
    pub fn new(
        settings: GatewaySettings,
        public_limiter: Option<TokenBucket>,
        private_limiter: Option<TokenBucket>,
    ) -> Self {
        Self {
            settings,
            public_limiter,
            private_limiter,
            client: OnceCell::new(),
        }
    }

    /// Lazy, race-free session creation: `OnceCell` guarantees the client
    /// is built exactly once no matter how many callers race to use it.
    pub async fn client(&self) -> Result<&reqwest::Client> {
        self.client
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .timeout(self.settings.request_timeout)
                    .user_agent(USER_AGENT)
                    .build()
                    .map_err(|e| Error::gateway(self.settings.name.clone(), e.to_string()))
            })
            .await
    }

    pub fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.settings.rest_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub fn choose_limiter(&self, signed: bool) -> Option<&TokenBucket> {
        if signed {
            self.private_limiter.as_ref()
        } else {
            self.public_limiter.as_ref()
        }
    }

    pub async fn acquire(&self, signed: bool) {
        if let Some(bucket) = self.choose_limiter(signed) {
            bucket.acquire(1.0).await;
        }
    }

    pub fn require_credentials(&self) -> Result<(&str, &str)> {
        match (&self.settings.access_key, &self.settings.secret_key) {
            (Some(a), Some(s)) => Ok((a.as_str(), s.as_str())),
            _ => Err(Error::gateway(
                self.settings.name.clone(),
                "signed request requires access_key/secret_key",
            )),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        url: String,
        headers: reqwest::header::HeaderMap,
        body: RequestBody,
    ) -> Result<Vec<u8>> {
        let client = self.client().await?;
        let mut builder = client.request(method.as_reqwest(), url).headers(headers);
        builder = match body {
            RequestBody::Query(params) => builder.query(&params),
            RequestBody::Json(params) => builder.json(&params),
            RequestBody::Form(encoded) => builder
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(encoded),
            RequestBody::None => builder,
        };
        let resp = builder.send().await.map_err(|e| {
            Error::gateway(self.settings.name.clone(), format!("request failed: {e}"))
        })?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            Error::gateway(
                self.settings.name.clone(),
                format!("reading body failed: {e}"),
            )
        })?;
        if status.as_u16() >= 400 {
            return Err(Error::gateway(
                self.settings.name.clone(),
                format!(
                    "status {}: {}",
                    status.as_u16(),
                    String::from_utf8_lossy(&body)
                ),
            ));
        }
        Ok(body.to_vec())
    }

    pub async fn ws_connect(&self, url: Option<&str>) -> Result<super::WsStream> {
        let target = url.unwrap_or(&self.settings.ws_url);
        let (stream, _response) = tokio_tungstenite::connect_async(target)
            .await
            .map_err(|e| {
                Error::gateway(
                    self.settings.name.clone(),
                    format!("ws_connect failed: {e}"),
                )
            })?;
        Ok(stream)
    }
}

pub enum RequestBody {
    None,
    Query(HashMap<String, String>),
    Json(HashMap<String, String>),
    Form(String),
}
