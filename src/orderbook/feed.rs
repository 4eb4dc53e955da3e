//! Keeps one order book subscribed and current, retrying on drop.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::warn;

use super::manager::OrderBookManager;
use crate::wrapper::Wrapper;

const RETRY_DELAY: std::time::Duration = std::time::Duration::from_secs(5);

pub struct OrderBookFeed {
    wrapper: Arc<dyn Wrapper>,
    symbol: String,
    manager: Arc<OrderBookManager>,
    stopping: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl OrderBookFeed {
    pub fn new(
        wrapper: Arc<dyn Wrapper>,
        symbol: impl Into<String>,
        manager: Arc<OrderBookManager>,
    ) -> Self {
        Self {
            wrapper,
            symbol: symbol.into(),
            manager,
            stopping: Arc::new(Notify::new()),
            task: None,
        }
    }

    pub async fn start(&mut self) -> crate::errors::Result<()> {
        self.manager
            .initialize(self.wrapper.as_ref(), &self.symbol)
            .await?;
        let wrapper = self.wrapper.clone();
        let symbol = self.symbol.clone();
        let manager = self.manager.clone();
        let stopping = self.stopping.clone();
        self.task = Some(tokio::spawn(async move {
            run(wrapper, symbol, manager, stopping).await;
        }));
        Ok(())
    }

    pub async fn stop(&mut self) {
        self.stopping.notify_one();
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

async fn run(
    wrapper: Arc<dyn Wrapper>,
    symbol: String,
    manager: Arc<OrderBookManager>,
    stopping: Arc<Notify>,
) {
    loop {
        let manager_for_cb = manager.clone();
        let callback: crate::wrapper::OrderBookCallback = Box::new(move |book| {
            let manager = manager_for_cb.clone();
            Box::pin(async move {
                manager.handle_orderbook_event(book);
            })
        });
        tokio::select! {
            result = wrapper.subscribe_orderbook(&symbol, callback) => {
                if let Err(err) = result {
                    warn!(symbol = %symbol, error = %err, "orderbook subscription dropped, retrying in 5s");
                    tokio::select! {
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                        _ = stopping.notified() => return,
                    }
                }
            }
            _ = stopping.notified() => return,
        }
    }
}
