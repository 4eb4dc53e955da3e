//! EX-B wire format: every response carries a top-level `status` code and
//! puts the real payload under `data`; balances come back as a flat map of
//! `available_<cur>` / `in_use_<cur>` / `total_<cur>` keys.

use rust_decimal::Decimal;
use serde_json::Value;

use super::{value_to_decimal, value_to_optional_decimal, Parser};
use crate::errors::{Error, Result};
use crate::types::{Balance, NamedBalance, OrderBook, OrderResult, PriceLevel};

pub struct ExBParser;

impl ExBParser {
    fn unwrap_success<'a>(&self, payload: &'a Value) -> Result<&'a Value> {
        let status = payload.get("status").and_then(Value::as_str);
        if status != Some("0000") {
            return Err(Error::parser(
                "ex-b",
                format!("api error: status={status:?}"),
            ));
        }
        payload
            .get("data")
            .ok_or_else(|| Error::parser("ex-b", "response missing data"))
    }
}

impl Parser for ExBParser {
    fn parse_orderbook(&self, raw: &[u8]) -> Result<OrderBook> {
        let payload: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::parser("ex-b", format!("invalid orderbook json: {e}")))?;
        let data = self.unwrap_success(&payload)?;
        let timestamp = data.get("timestamp").and_then(Value::as_i64).unwrap_or(0);
        let levels = |side: &str| -> Vec<PriceLevel> {
            data.get(side)
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .map(|lvl| PriceLevel {
                            price: value_to_decimal(&lvl["price"]),
                            quantity: value_to_decimal(&lvl["quantity"]),
                            timestamp,
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        let symbol = data
            .get("order_currency")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(OrderBook {
            symbol,
            venue: "ex-b".to_string(),
            bids: levels("bids"),
            asks: levels("asks"),
            sequence: timestamp,
            timestamp,
        })
    }

    fn parse_balance(&self, raw: &[u8]) -> Result<Vec<NamedBalance>> {
        let payload: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::parser("ex-b", format!("invalid balance json: {e}")))?;
        let data = self.unwrap_success(&payload)?;
        let object = data
            .as_object()
            .ok_or_else(|| Error::parser("ex-b", "balance data is not an object"))?;
        let mut balances = Vec::new();
        for (key, value) in object {
            let Some(currency) = key.strip_prefix("available_") else {
                continue;
            };
            let currency = currency.to_uppercase();
            let available = value_to_decimal(value);
            let locked = object
                .get(&format!("in_use_{}", currency.to_lowercase()))
                .map(value_to_decimal)
                .unwrap_or_default();
            let total = object
                .get(&format!("total_{}", currency.to_lowercase()))
                .map(value_to_decimal)
                .unwrap_or(available + locked);
            balances.push(NamedBalance {
                venue: "ex-b".to_string(),
                currency,
                balance: Balance {
                    available,
                    locked,
                    total,
                },
            });
        }
        Ok(balances)
    }

    fn parse_order_result(&self, raw: &[u8]) -> Result<OrderResult> {
        let payload: Value = serde_json::from_slice(raw)
            .map_err(|e| Error::parser("ex-b", format!("invalid order result json: {e}")))?;
        let data = self.unwrap_success(&payload)?;
        let order_id = data
            .get("order_id")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        let symbol = data
            .get("order_currency")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let status = data
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let filled_quantity: Decimal = data
            .get("contract_amount")
            .map(value_to_decimal)
            .unwrap_or_default();
        let average_price = data
            .get("contract_price")
            .and_then(value_to_optional_decimal);
        Ok(OrderResult {
            order_id,
            venue: "ex-b".to_string(),
            symbol,
            status,
            filled_quantity,
            average_price,
            raw: Some(data.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_success_status() {
        let raw = br#"{"status":"5600","message":"bad"}"#;
        assert!(ExBParser.parse_orderbook(raw).is_err());
    }

    #[test]
    fn parses_bids_and_asks() {
        let raw = br#"{"status":"0000","data":{"order_currency":"BTC","timestamp":42,
            "bids":[{"price":"100","quantity":"1"}],
            "asks":[{"price":"110","quantity":"2"}]}}"#;
        let book = ExBParser.parse_orderbook(raw).unwrap();
        assert_eq!(book.sequence, 42);
        assert_eq!(book.bids[0].price, dec!(100));
        assert_eq!(book.asks[0].quantity, dec!(2));
    }

    #[test]
    fn balance_keys_by_available_prefix() {
        let raw = br#"{"status":"0000","data":{
            "available_btc":"1.0","in_use_btc":"0.25","total_btc":"1.25"
        }}"#;
        let balances = ExBParser.parse_balance(raw).unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].currency, "BTC");
        assert_eq!(balances[0].balance.available, dec!(1.0));
        assert_eq!(balances[0].balance.locked, dec!(0.25));
        assert_eq!(balances[0].balance.total, dec!(1.25));
    }
}
