use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use tokio_tungstenite::tungstenite::Message;

use super::{OrderBookCallback, Wrapper};
use crate::errors::{Error, Result};
use crate::gateway::{Gateway, Method};
use crate::parser::Parser;
use crate::types::{NamedBalance, OrderBook, OrderRequest, OrderResult};

pub struct ExBWrapper {
    gateway: Arc<dyn Gateway>,
    parser: Arc<dyn Parser>,
}

impl ExBWrapper {
    pub fn new(gateway: Arc<dyn Gateway>, parser: Arc<dyn Parser>) -> Self {
        Self { gateway, parser }
    }
}

fn split_symbol(symbol: &str) -> (String, String) {
    match symbol.split_once('_') {
        Some((base, quote)) => (base.to_string(), quote.to_string()),
        None => (symbol.to_string(), String::new()),
    }
}

#[async_trait]
impl Wrapper for ExBWrapper {
    async fn get_orderbook(&self, symbol: &str) -> Result<OrderBook> {
        let endpoint = format!("/public/orderbook/{symbol}");
        let raw = self
            .gateway
            .request(Method::Get, &endpoint, None, false)
            .await?;
        self.parser.parse_orderbook(&raw)
    }

    async fn get_balance(&self) -> Result<Vec<NamedBalance>> {
        let mut params = HashMap::new();
        params.insert("currency".to_string(), "ALL".to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/info/balance", Some(params), true)
            .await?;
        self.parser.parse_balance(&raw)
    }

    async fn place_order(&self, order: OrderRequest) -> Result<OrderResult> {
        let (base, quote) = split_symbol(&order.symbol);
        let mut params = HashMap::new();
        params.insert("order_currency".to_string(), base);
        params.insert("payment_currency".to_string(), quote);
        params.insert("units".to_string(), order.quantity.to_string());
        params.insert(
            "price".to_string(),
            order.price.unwrap_or(Decimal::ZERO).to_string(),
        );
        params.insert("type".to_string(), side_str(order.side).to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/trade/place", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<OrderResult> {
        let mut params = HashMap::new();
        params.insert("order_id".to_string(), order_id.to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/trade/cancel", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn get_order_status(&self, order_id: &str) -> Result<OrderResult> {
        let mut params = HashMap::new();
        params.insert("order_id".to_string(), order_id.to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/info/order_detail", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn buy_market_order(&self, symbol: &str, amount: Decimal) -> Result<OrderResult> {
        let (base, quote) = split_symbol(symbol);
        let mut params = HashMap::new();
        params.insert("order_currency".to_string(), base);
        params.insert("payment_currency".to_string(), quote);
        params.insert("units".to_string(), amount.to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/trade/market_buy", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn sell_market_order(&self, symbol: &str, volume: Decimal) -> Result<OrderResult> {
        let (base, quote) = split_symbol(symbol);
        let mut params = HashMap::new();
        params.insert("order_currency".to_string(), base);
        params.insert("payment_currency".to_string(), quote);
        params.insert("units".to_string(), volume.to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/trade/market_sell", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn subscribe_orderbook(&self, symbol: &str, callback: OrderBookCallback) -> Result<()> {
        let mut ws = self.gateway.ws_connect(None).await?;
        let frame = serde_json::json!({
            "type": "orderbookdepth",
            "symbols": [symbol],
            "tickTypes": ["30"],
        });
        ws.send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| Error::wrapper("ex-b", format!("ws send failed: {e}")))?;
        while let Some(msg) = ws.next().await {
            let msg = msg.map_err(|e| Error::wrapper("ex-b", format!("ws recv failed: {e}")))?;
            let bytes = match msg {
                Message::Text(t) => t.into_bytes(),
                Message::Binary(b) => b,
                Message::Close(_) => break,
                _ => continue,
            };
            let normalized = wrap_with_status(&bytes);
            let book = self.parser.parse_orderbook(&normalized)?;
            callback(book).await;
        }
        Ok(())
    }

    async fn close(&self) {
        self.gateway.close().await;
    }

    fn name(&self) -> &str {
        "ex-b"
    }
}

/// The venue's WS push nests the real payload under `content`; re-wrap it
/// into the same `{status, data}` envelope the REST parser already expects.
fn wrap_with_status(bytes: &[u8]) -> Vec<u8> {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) else {
        return bytes.to_vec();
    };
    let data = value.get("content").cloned().unwrap_or(value);
    serde_json::to_vec(&serde_json::json!({"status": "0000", "data": data})).unwrap_or_default()
}

fn side_str(side: crate::types::OrderSide) -> &'static str {
    match side {
        crate::types::OrderSide::Bid => "bid",
        crate::types::OrderSide::Ask => "ask",
    }
}
