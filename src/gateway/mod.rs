//! Per-venue transport: signed/unsigned HTTP and WebSocket connect.

pub mod auth;
pub mod core;
pub mod ex_a;
pub mod ex_b;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::errors::Result;

pub use ex_a::ExAGateway;
pub use ex_b::ExBGateway;

/// A connected WebSocket, TLS-upgraded transparently by `tokio-tungstenite`.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Per-venue connection settings.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub name: String,
    pub rest_base_url: String,
    pub ws_url: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub request_timeout: Duration,
}

/// HTTP method, kept narrow to what the venues actually need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Transport abstraction implemented once per venue. Every operation is
/// awaitable; a single `request` entry point handles both signed and
/// unsigned calls, with the signing strategy supplied by the implementor.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send an HTTP request and return the raw response body.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<HashMap<String, String>>,
        signed: bool,
    ) -> Result<Vec<u8>>;

    /// Open a WebSocket connection, defaulting to this gateway's configured
    /// `ws_url` when `url` is `None`.
    async fn ws_connect(&self, url: Option<&str>) -> Result<WsStream>;

    /// Release the underlying HTTP session, if one was ever created.
    async fn close(&self);

    fn name(&self) -> &str;
}
