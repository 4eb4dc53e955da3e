//! EX-A transport: JWT-bearer signed requests, JSON bodies for writes.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use super::core::{HttpCore, RequestBody};
use super::{Gateway, GatewaySettings, Method, WsStream};
use crate::errors::{Error, Result};
use crate::ratelimit::{default_limit, TokenBucket};

pub struct ExAGateway {
    core: HttpCore,
}

impl ExAGateway {
    pub fn new(
        rest_base: String,
        ws_url: String,
        access_key: Option<String>,
        secret_key: Option<String>,
    ) -> Self {
        let limits = default_limit("ex-a");
        let settings = GatewaySettings {
            name: "ex-a".to_string(),
            rest_base_url: rest_base,
            ws_url,
            access_key,
            secret_key,
            request_timeout: Duration::from_secs(10),
        };
        Self {
            core: HttpCore::new(
                settings,
                Some(TokenBucket::new(limits.public_capacity, limits.public_rate)),
                Some(TokenBucket::new(
                    limits.private_capacity,
                    limits.private_rate,
                )),
            ),
        }
    }
}

#[async_trait]
impl Gateway for ExAGateway {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
        signed: bool,
    ) -> Result<Vec<u8>> {
        self.core.acquire(signed).await;
        let url = self.core.build_url(endpoint);
        let mut headers = HeaderMap::new();
        if signed {
            let (access_key, secret_key) = self.core.require_credentials()?;
            let sorted: Option<BTreeMap<String, String>> = params
                .as_ref()
                .map(|p| p.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
            let bearer = super::auth::ex_a_bearer(access_key, secret_key, sorted.as_ref())?;
            let value = HeaderValue::from_str(&bearer)
                .map_err(|e| Error::gateway("ex-a", format!("invalid auth header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        let body = match (method, params) {
            (Method::Get, Some(p)) => RequestBody::Query(p),
            (Method::Get, None) => RequestBody::None,
            (_, Some(p)) => RequestBody::Json(p),
            (_, None) => RequestBody::None,
        };
        self.core.send(method, url, headers, body).await
    }

    async fn ws_connect(&self, url: Option<&str>) -> Result<WsStream> {
        self.core.ws_connect(url).await
    }

    async fn close(&self) {}

    fn name(&self) -> &str {
        "ex-a"
    }
}
