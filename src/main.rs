//! CLI entry point: loads configuration, wires the per-venue gateways and
//! wrappers into an [`Engine`], and runs until SIGINT.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kimchi_arb::config::{self, PairSpec};
use kimchi_arb::engine::{Engine, PairContext};
use kimchi_arb::executor::OrderExecutor;
use kimchi_arb::gateway::{ExAGateway, ExBGateway, Gateway};
use kimchi_arb::orderbook::{OrderBookFeed, OrderBookManager};
use kimchi_arb::parser::ex_a::ExAParser;
use kimchi_arb::parser::ex_b::ExBParser;
use kimchi_arb::risk::{CircuitBreakerConfig, PositionLimit, RiskConfig, RiskManager};
use kimchi_arb::strategy::{SpreadArbitrageStrategy, Strategy, StrategyConfig};
use kimchi_arb::wrapper::ex_a::ExAWrapper;
use kimchi_arb::wrapper::ex_b::ExBWrapper;
use kimchi_arb::wrapper::Wrapper;

#[derive(Parser, Debug)]
#[command(name = "kimchi-arb")]
#[command(about = "Cross-venue spot-arbitrage trading engine")]
struct Args {
    /// Path to the trading config YAML (defaults to config/development.yaml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to an enumerated pairs.yaml, overriding config/pairs.yaml.
    #[arg(long)]
    pairs: Option<PathBuf>,

    /// Force dry-run regardless of the config file's `dry_run` setting.
    #[arg(long, conflicts_with = "no_dry_run")]
    dry_run: bool,

    /// Force live trading regardless of the config file's `dry_run` setting.
    #[arg(long)]
    no_dry_run: bool,

    /// Raise the log level to debug.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let config = config::load(args.config.as_deref()).context("failed to load config")?;
    let pairs = config::load_pairs(&config, args.pairs.as_deref());
    let dry_run = if args.no_dry_run {
        false
    } else {
        config.dry_run || args.dry_run
    };

    info!(pairs = pairs.len(), dry_run, "starting kimchi-arb");

    let wrapper_a: Arc<dyn Wrapper> = Arc::new(ExAWrapper::new(
        Arc::new(ExAGateway::new(
            config.exchanges.a.rest_base.clone(),
            config.exchanges.a.websocket_url.clone(),
            config.exchanges.a.access_key.clone(),
            config.exchanges.a.secret_key.clone(),
        )) as Arc<dyn Gateway>,
        Arc::new(ExAParser),
    ));
    let wrapper_b: Arc<dyn Wrapper> = Arc::new(ExBWrapper::new(
        Arc::new(ExBGateway::new(
            config.exchanges.b.rest_base.clone(),
            config.exchanges.b.websocket_url.clone(),
            config.exchanges.b.access_key.clone(),
            config.exchanges.b.secret_key.clone(),
        )) as Arc<dyn Gateway>,
        Arc::new(ExBParser),
    ));

    let strategy: Arc<dyn Strategy> = Arc::new(SpreadArbitrageStrategy::new(StrategyConfig {
        min_profit_rate: config.trading.min_profit_rate,
        max_volume: config.trading.max_volume,
        fee_a: config.fees.fee_a,
        fee_b: config.fees.fee_b,
    }));

    let risk_manager = Arc::new(RiskManager::new(RiskConfig {
        reserve_ratio: config.risk.reserve_ratio,
        position_limit: PositionLimit {
            max_volume: config.risk.max_volume,
            max_notional: config.risk.max_notional,
        },
        circuit_breaker: CircuitBreakerConfig {
            failure_threshold: config.risk.circuit_breaker_failures,
            cool_down: Duration::from_secs(config.risk.circuit_breaker_cooldown_secs),
        },
    }));

    let poll_interval = Duration::from_secs_f64(config.trading.poll_interval);
    let mut engine = Engine::new(
        wrapper_a.clone(),
        wrapper_b.clone(),
        strategy,
        risk_manager,
        poll_interval,
    );

    for pair in &pairs {
        engine.attach_pair(build_pair(
            pair,
            wrapper_a.clone(),
            wrapper_b.clone(),
            dry_run,
        ));
    }

    let stop_flag = engine.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received SIGINT, shutting down");
            stop_flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });

    engine.start().await?;
    wrapper_a.close().await;
    wrapper_b.close().await;
    Ok(())
}

fn build_pair(
    pair: &PairSpec,
    wrapper_a: Arc<dyn Wrapper>,
    wrapper_b: Arc<dyn Wrapper>,
    dry_run: bool,
) -> PairContext {
    let manager_a = Arc::new(OrderBookManager::new());
    let manager_b = Arc::new(OrderBookManager::new());
    let feed_a = OrderBookFeed::new(wrapper_a.clone(), pair.symbol_a.clone(), manager_a.clone());
    let feed_b = OrderBookFeed::new(wrapper_b.clone(), pair.symbol_b.clone(), manager_b.clone());
    let executor = OrderExecutor::new(
        wrapper_a,
        wrapper_b,
        pair.symbol_a.clone(),
        pair.symbol_b.clone(),
        dry_run,
    );
    PairContext {
        name: pair.name.clone(),
        symbol_a: pair.symbol_a.clone(),
        symbol_b: pair.symbol_b.clone(),
        manager_a,
        manager_b,
        feed_a,
        feed_b,
        executor,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kimchi_arb={default_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
