//! Business-facing API: REST calls plus a normalized orderbook subscription,
//! built on top of one venue's [`crate::gateway::Gateway`] + [`crate::parser::Parser`] pair.

pub mod ex_a;
pub mod ex_b;

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::types::{NamedBalance, OrderBook, OrderRequest, OrderResult};

pub type OrderBookCallback =
    Box<dyn Fn(OrderBook) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[async_trait]
pub trait Wrapper: Send + Sync {
    async fn get_orderbook(&self, symbol: &str) -> Result<OrderBook>;
    async fn get_balance(&self) -> Result<Vec<NamedBalance>>;
    async fn place_order(&self, order: OrderRequest) -> Result<OrderResult>;
    async fn cancel_order(&self, order_id: &str) -> Result<OrderResult>;
    async fn get_order_status(&self, order_id: &str) -> Result<OrderResult>;
    async fn buy_market_order(&self, symbol: &str, amount: Decimal) -> Result<OrderResult>;
    async fn sell_market_order(&self, symbol: &str, volume: Decimal) -> Result<OrderResult>;
    async fn subscribe_orderbook(&self, symbol: &str, callback: OrderBookCallback) -> Result<()>;
    async fn close(&self);
    fn name(&self) -> &str;
}
