//! EX-B transport: HMAC header signing, form-urlencoded bodies for writes.
//! Signed requests fold the endpoint into the signed parameter set the way
//! the venue's signature scheme requires.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::core::{HttpCore, RequestBody};
use super::{Gateway, GatewaySettings, Method, WsStream};
use crate::errors::{Error, Result};
use crate::ratelimit::{default_limit, TokenBucket};

pub struct ExBGateway {
    core: HttpCore,
}

impl ExBGateway {
    pub fn new(
        rest_base: String,
        ws_url: String,
        access_key: Option<String>,
        secret_key: Option<String>,
    ) -> Self {
        let limits = default_limit("ex-b");
        let settings = GatewaySettings {
            name: "ex-b".to_string(),
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
impl Gateway for ExBGateway {
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
        let mut effective_params = params.clone().unwrap_or_default();

        if signed && method != Method::Get {
            effective_params
                .entry("endpoint".to_string())
                .or_insert_with(|| endpoint.to_string());
        }
        // Same ordered collection feeds both the signature and the wire body,
        // so the bytes that get signed are the bytes that get sent.
        let sorted: BTreeMap<String, String> = effective_params.into_iter().collect();

        if signed {
            let (access_key, secret_key) = self.core.require_credentials()?;
            for (name, value) in
                super::auth::ex_b_headers(access_key, secret_key, endpoint, &sorted)?
            {
                let header_name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::gateway("ex-b", format!("invalid header name: {e}")))?;
                let header_value = HeaderValue::from_str(&value)
                    .map_err(|e| Error::gateway("ex-b", format!("invalid header value: {e}")))?;
                headers.insert(header_name, header_value);
            }
        }

        let body = match method {
            Method::Get => RequestBody::Query(sorted.into_iter().collect()),
            _ => RequestBody::Form(form_encode(&sorted)),
        };
        self.core.send(method, url, headers, body).await
    }

    async fn ws_connect(&self, url: Option<&str>) -> Result<WsStream> {
        self.core.ws_connect(url).await
    }

    async fn close(&self) {}

    fn name(&self) -> &str {
        "ex-b"
    }
}

fn form_encode(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_encode_matches_the_order_the_signature_is_computed_over() {
        let mut params = BTreeMap::new();
        params.insert("units".to_string(), "0.1".to_string());
        params.insert("order_currency".to_string(), "BTC".to_string());
        params.insert("endpoint".to_string(), "/trade/market_sell".to_string());

        let body = form_encode(&params);
        let signed =
            super::super::auth::ex_b_headers("key", "secret", "/trade/market_sell", &params)
                .unwrap();
        // Both the body and the Api-Sign header are derived from the same
        // sorted map, so re-deriving the body from that map must reproduce
        // exactly what was signed: alphabetical key order, `&`-joined.
        assert_eq!(
            body,
            "endpoint=%2Ftrade%2Fmarket_sell&order_currency=BTC&units=0.1"
        );
        assert!(signed.iter().any(|(k, _)| k == "Api-Sign"));
    }
}
