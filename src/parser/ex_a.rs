//! EX-A wire format: orderbook payload is a single-element array, balance
//! rows are `{currency, balance, locked}`.

use rust_decimal::Decimal;
use serde_json::Value;

use super::{value_to_decimal, value_to_optional_decimal, Parser};
use crate::errors::{Error, Result};
use crate::types::{Balance, NamedBalance, OrderBook, OrderResult, PriceLevel};

pub struct ExAParser;

impl Parser for ExAParser {
    fn parse_orderbook(&self, raw: &[u8]) -> Result<OrderBook> {
        let decoded: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::parser("ex-a", format!("invalid orderbook json: {e}")))?;
        let payload = decoded
            .get(0)
            .ok_or_else(|| Error::parser("ex-a", "orderbook payload missing element 0"))?;
        let sequence = payload
            .get("timestamp")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let units = payload
            .get("orderbook_units")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut bids = Vec::with_capacity(units.len());
        let mut asks = Vec::with_capacity(units.len());
        for unit in &units {
            bids.push(PriceLevel {
                price: value_to_decimal(&unit["bid_price"]),
                quantity: value_to_decimal(&unit["bid_size"]),
                timestamp: sequence,
            });
            asks.push(PriceLevel {
                price: value_to_decimal(&unit["ask_price"]),
                quantity: value_to_decimal(&unit["ask_size"]),
                timestamp: sequence,
            });
        }
        let symbol = payload
            .get("market")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::parser("ex-a", "orderbook payload missing market"))?
            .to_string();
        Ok(OrderBook {
            symbol,
            venue: "ex-a".to_string(),
            bids,
            asks,
            sequence,
            timestamp: sequence,
        })
    }

    fn parse_balance(&self, raw: &[u8]) -> Result<Vec<NamedBalance>> {
        let decoded: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::parser("ex-a", format!("invalid balance json: {e}")))?;
        let items = decoded
            .as_array()
            .ok_or_else(|| Error::parser("ex-a", "balance payload is not an array"))?;
        let mut balances = Vec::with_capacity(items.len());
        for item in items {
            let available = value_to_decimal(&item["balance"]);
            let locked = value_to_decimal(&item["locked"]);
            let currency = item
                .get("currency")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::parser("ex-a", "balance item missing currency"))?
                .to_string();
            balances.push(NamedBalance {
                venue: "ex-a".to_string(),
                currency,
                balance: Balance {
                    available,
                    locked,
                    total: available + locked,
                },
            });
        }
        Ok(balances)
    }

    fn parse_order_result(&self, raw: &[u8]) -> Result<OrderResult> {
        let payload: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::parser("ex-a", format!("invalid order result json: {e}")))?;
        let order_id = payload
            .get("uuid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let symbol = payload
            .get("market")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let status = payload
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let filled_quantity: Decimal = payload
            .get("executed_volume")
            .map(value_to_decimal)
            .unwrap_or_default();
        let average_price = payload.get("avg_price").and_then(value_to_optional_decimal);
        Ok(OrderResult {
            order_id,
            venue: "ex-a".to_string(),
            symbol,
            status,
            filled_quantity,
            average_price,
            raw: Some(payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_array_wrapped_orderbook() {
        let raw = br#"[{"market":"KRW-BTC","timestamp":123,"orderbook_units":[
            {"bid_price":"100","bid_size":"1","ask_price":"110","ask_size":"2"}
        ]}]"#;
        let book = ExAParser.parse_orderbook(raw).unwrap();
        assert_eq!(book.symbol, "KRW-BTC");
        assert_eq!(book.sequence, 123);
        assert_eq!(book.bids[0].price, dec!(100));
        assert_eq!(book.asks[0].quantity, dec!(2));
    }

    #[test]
    fn balance_total_is_available_plus_locked() {
        let raw = br#"[{"currency":"BTC","balance":"1.5","locked":"0.5"}]"#;
        let balances = ExAParser.parse_balance(raw).unwrap();
        assert_eq!(balances[0].balance.total, dec!(2.0));
    }
}
