//! YAML configuration loading. A missing or malformed file is a
//! `ConfigError`; nothing here falls back to hand-rolled parsing.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::{Error, Result};

const DEFAULT_CONFIG_PATH: &str = "config/development.yaml";
const PAIRS_FILE: &str = "config/pairs.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    pub rest_base: String,
    pub websocket_url: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    pub symbol_a: String,
    pub symbol_b: String,
    pub min_profit_rate: Decimal,
    #[serde(default = "default_max_volume")]
    pub max_volume: Decimal,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: f64,
    #[serde(default)]
    pub pairs: Vec<String>,
}

fn default_max_volume() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

fn default_poll_interval() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    pub fee_a: Decimal,
    pub fee_b: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskSettings {
    pub reserve_ratio: Decimal,
    pub max_volume: Decimal,
    pub max_notional: Decimal,
    pub circuit_breaker_failures: u32,
    pub circuit_breaker_cooldown_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangesConfig {
    pub a: ExchangeConfig,
    pub b: ExchangeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub exchanges: ExchangesConfig,
    pub trading: TradingConfig,
    pub risk: RiskSettings,
    pub fees: FeesConfig,
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

fn default_dry_run() -> bool {
    true
}

fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    if !path.exists() {
        return Err(Error::Config(format!(
            "config file does not exist: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read config file: {e}")))?;
    serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse config file: {e}")))
}

/// One tradeable pair, resolved to the per-venue symbol format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSpec {
    pub name: String,
    pub symbol_a: String,
    pub symbol_b: String,
}

#[derive(Debug, Default, Deserialize)]
struct PairsFile {
    #[serde(default)]
    pairs: Vec<String>,
}

/// Resolve the tradeable-pair list: an explicit `pairs_path` override wins,
/// then `config/pairs.yaml` if present and non-empty, then `trading.pairs`,
/// then a single pair derived from `trading.symbol_a`/`symbol_b`.
/// `MAX_DRYRUN_PAIRS` truncates whatever list results.
pub fn load_pairs(config: &Config, pairs_path: Option<&Path>) -> Vec<PairSpec> {
    let mut bases =
        pairs_file_bases(pairs_path.unwrap_or(Path::new(PAIRS_FILE))).unwrap_or_default();
    if bases.is_empty() {
        bases = config.trading.pairs.clone();
    }

    let mut pairs: Vec<PairSpec> = bases
        .iter()
        .filter_map(|entry| {
            let (base, quote) = entry.split_once('/')?;
            let base = base.trim();
            let quote = quote.trim();
            if base.is_empty() || quote.is_empty() {
                return None;
            }
            Some(PairSpec {
                name: base.to_string(),
                symbol_a: format!("{quote}-{base}"),
                symbol_b: format!("{base}_{quote}"),
            })
        })
        .collect();

    if pairs.is_empty() {
        pairs.push(PairSpec {
            name: config.trading.symbol_a.clone(),
            symbol_a: config.trading.symbol_a.clone(),
            symbol_b: config.trading.symbol_b.clone(),
        });
    }

    if let Ok(max) = std::env::var("MAX_DRYRUN_PAIRS") {
        if let Ok(max) = max.parse::<usize>() {
            pairs.truncate(max);
        }
    }
    pairs
}

fn pairs_file_bases(path: &Path) -> Option<Vec<String>> {
    if !path.exists() {
        return None;
    }
    let content = std::fs::read_to_string(path).ok()?;
    let parsed: PairsFile = serde_yaml::from_str(&content).ok()?;
    if parsed.pairs.is_empty() {
        None
    } else {
        Some(parsed.pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load(Some(Path::new("/nonexistent/path.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn parses_a_full_config() {
        let yaml = r#"
exchanges:
  a:
    rest_base: "https://api.ex-a.example"
    websocket_url: "wss://api.ex-a.example/ws"
  b:
    rest_base: "https://api.ex-b.example"
    websocket_url: "wss://api.ex-b.example/ws"
trading:
  symbol_a: "QUOTE-BTC"
  symbol_b: "BTC_QUOTE"
  min_profit_rate: "0.001"
risk:
  reserve_ratio: "0.1"
  max_volume: "0.5"
  max_notional: "100000000"
  circuit_breaker_failures: 3
  circuit_breaker_cooldown_secs: 5
fees:
  fee_a: "0.001"
  fee_b: "0.0025"
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.trading.symbol_a, "QUOTE-BTC");
        assert!(config.dry_run);
    }

    fn base_config() -> Config {
        Config {
            exchanges: ExchangesConfig {
                a: ExchangeConfig {
                    rest_base: "https://api.ex-a.example".into(),
                    websocket_url: "wss://api.ex-a.example/ws".into(),
                    access_key: None,
                    secret_key: None,
                },
                b: ExchangeConfig {
                    rest_base: "https://api.ex-b.example".into(),
                    websocket_url: "wss://api.ex-b.example/ws".into(),
                    access_key: None,
                    secret_key: None,
                },
            },
            trading: TradingConfig {
                symbol_a: "QUOTE-BTC".into(),
                symbol_b: "BTC_QUOTE".into(),
                min_profit_rate: rust_decimal_macros::dec!(0.001),
                max_volume: default_max_volume(),
                poll_interval: default_poll_interval(),
                pairs: Vec::new(),
            },
            risk: RiskSettings {
                reserve_ratio: rust_decimal_macros::dec!(0.1),
                max_volume: rust_decimal_macros::dec!(0.5),
                max_notional: rust_decimal_macros::dec!(100_000_000),
                circuit_breaker_failures: 3,
                circuit_breaker_cooldown_secs: 5,
            },
            fees: FeesConfig {
                fee_a: rust_decimal_macros::dec!(0.001),
                fee_b: rust_decimal_macros::dec!(0.0025),
            },
            dry_run: true,
        }
    }

    #[test]
    fn load_pairs_falls_back_to_trading_symbols_when_no_pairs_file() {
        let config = base_config();
        let pairs = load_pairs(&config, Some(Path::new("/nonexistent/pairs.yaml")));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].symbol_a, "QUOTE-BTC");
        assert_eq!(pairs[0].symbol_b, "BTC_QUOTE");
    }

    #[test]
    fn load_pairs_reads_an_override_pairs_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.yaml");
        std::fs::write(&path, "pairs: [\"BTC/KRW\", \"ETH/KRW\"]\n").unwrap();
        let config = base_config();
        let pairs = load_pairs(&config, Some(&path));
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].name, "BTC");
        assert_eq!(pairs[0].symbol_a, "KRW-BTC");
        assert_eq!(pairs[0].symbol_b, "BTC_KRW");
        assert_eq!(pairs[1].name, "ETH");
        assert_eq!(pairs[1].symbol_a, "KRW-ETH");
        assert_eq!(pairs[1].symbol_b, "ETH_KRW");
    }
}
