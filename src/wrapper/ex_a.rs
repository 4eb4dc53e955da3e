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

pub struct ExAWrapper {
    gateway: Arc<dyn Gateway>,
    parser: Arc<dyn Parser>,
}

impl ExAWrapper {
    pub fn new(gateway: Arc<dyn Gateway>, parser: Arc<dyn Parser>) -> Self {
        Self { gateway, parser }
    }
}

#[async_trait]
impl Wrapper for ExAWrapper {
    async fn get_orderbook(&self, symbol: &str) -> Result<OrderBook> {
        let mut params = HashMap::new();
        params.insert("markets".to_string(), symbol.to_string());
        let raw = self
            .gateway
            .request(Method::Get, "/v1/orderbook", Some(params), false)
            .await?;
        self.parser.parse_orderbook(&raw)
    }

    async fn get_balance(&self) -> Result<Vec<NamedBalance>> {
        let raw = self
            .gateway
            .request(Method::Get, "/v1/accounts", None, true)
            .await?;
        self.parser.parse_balance(&raw)
    }

    async fn place_order(&self, order: OrderRequest) -> Result<OrderResult> {
        let mut params = HashMap::new();
        params.insert("market".to_string(), order.symbol.clone());
        params.insert("side".to_string(), side_str(order.side).to_string());
        params.insert(
            "ord_type".to_string(),
            order_type_str(order.order_type).to_string(),
        );
        params.insert("volume".to_string(), order.quantity.to_string());
        if let Some(price) = order.price {
            params.insert("price".to_string(), price.to_string());
        }
        let raw = self
            .gateway
            .request(Method::Post, "/v1/orders", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<OrderResult> {
        let mut params = HashMap::new();
        params.insert("uuid".to_string(), order_id.to_string());
        let raw = self
            .gateway
            .request(Method::Delete, "/v1/order", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn get_order_status(&self, order_id: &str) -> Result<OrderResult> {
        let mut params = HashMap::new();
        params.insert("uuid".to_string(), order_id.to_string());
        let raw = self
            .gateway
            .request(Method::Get, "/v1/order", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    /// `ord_type=price`: a market buy denominated in the quote currency —
    /// `amount` is the KRW amount to spend, not a base-unit volume.
    async fn buy_market_order(&self, symbol: &str, amount: Decimal) -> Result<OrderResult> {
        let mut params = HashMap::new();
        params.insert("market".to_string(), symbol.to_string());
        params.insert("side".to_string(), "bid".to_string());
        params.insert("ord_type".to_string(), "price".to_string());
        params.insert("price".to_string(), amount.to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/v1/orders", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    /// `ord_type=market`: a market sell denominated in the base currency.
    async fn sell_market_order(&self, symbol: &str, volume: Decimal) -> Result<OrderResult> {
        let mut params = HashMap::new();
        params.insert("market".to_string(), symbol.to_string());
        params.insert("side".to_string(), "ask".to_string());
        params.insert("ord_type".to_string(), "market".to_string());
        params.insert("volume".to_string(), volume.to_string());
        let raw = self
            .gateway
            .request(Method::Post, "/v1/orders", Some(params), true)
            .await?;
        self.parser.parse_order_result(&raw)
    }

    async fn subscribe_orderbook(&self, symbol: &str, callback: OrderBookCallback) -> Result<()> {
        let mut ws = self.gateway.ws_connect(None).await?;
        let frame = serde_json::json!([
            {"ticket": "kimchi-arb"},
            {"type": "orderbook", "codes": [symbol], "isOnlyRealtime": true},
        ]);
        ws.send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| Error::wrapper("ex-a", format!("ws send failed: {e}")))?;
        while let Some(msg) = ws.next().await {
            let msg = msg.map_err(|e| Error::wrapper("ex-a", format!("ws recv failed: {e}")))?;
            let bytes = match msg {
                Message::Text(t) => t.into_bytes(),
                Message::Binary(b) => b,
                Message::Close(_) => break,
                _ => continue,
            };
            let normalized = wrap_as_array(&bytes);
            let book = self.parser.parse_orderbook(&normalized)?;
            callback(book).await;
        }
        Ok(())
    }

    async fn close(&self) {
        self.gateway.close().await;
    }

    fn name(&self) -> &str {
        "ex-a"
    }
}

/// EX-A's WS push is a bare object keyed by `code` rather than the REST
/// field `market`; re-wrap it into a single-element array and map `code` to
/// `market` when the latter is absent, matching what the parser expects.
fn wrap_as_array(bytes: &[u8]) -> Vec<u8> {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(serde_json::Value::Array(mut arr)) => {
            for item in &mut arr {
                map_code_to_market(item);
            }
            serde_json::to_vec(&serde_json::Value::Array(arr)).unwrap_or_default()
        }
        Ok(mut value) => {
            map_code_to_market(&mut value);
            serde_json::to_vec(&serde_json::Value::Array(vec![value])).unwrap_or_default()
        }
        Err(_) => bytes.to_vec(),
    }
}

fn map_code_to_market(value: &mut serde_json::Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    if object.contains_key("market") {
        return;
    }
    if let Some(code) = object.get("code").cloned() {
        object.insert("market".to_string(), code);
    }
}

fn side_str(side: crate::types::OrderSide) -> &'static str {
    match side {
        crate::types::OrderSide::Bid => "bid",
        crate::types::OrderSide::Ask => "ask",
    }
}

fn order_type_str(order_type: crate::types::OrderType) -> &'static str {
    match order_type {
        crate::types::OrderType::Limit => "limit",
        crate::types::OrderType::Market => "market",
        crate::types::OrderType::Price => "price",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_as_array_maps_code_to_market_on_bare_push() {
        let raw = br#"{"code":"KRW-BTC","timestamp":1,"orderbook_units":[]}"#;
        let wrapped = wrap_as_array(raw);
        let value: serde_json::Value = serde_json::from_slice(&wrapped).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["market"], "KRW-BTC");
    }

    #[test]
    fn wrap_as_array_leaves_existing_market_field_untouched() {
        let raw = br#"{"market":"KRW-BTC","code":"other","timestamp":1,"orderbook_units":[]}"#;
        let wrapped = wrap_as_array(raw);
        let value: serde_json::Value = serde_json::from_slice(&wrapped).unwrap();
        assert_eq!(value[0]["market"], "KRW-BTC");
    }

    #[test]
    fn wrap_as_array_passes_through_already_wrapped_pushes() {
        let raw = br#"[{"code":"KRW-BTC","timestamp":1,"orderbook_units":[]}]"#;
        let wrapped = wrap_as_array(raw);
        let value: serde_json::Value = serde_json::from_slice(&wrapped).unwrap();
        assert_eq!(value[0]["market"], "KRW-BTC");
    }
}
