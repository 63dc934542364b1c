//! Fixed-cadence polling where the newest request always wins

use crate::error::{ClientError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Background poller publishing the latest successful fetch
///
/// A fetch is issued immediately, then on every tick. When a tick fires
/// while a fetch is still in flight, that fetch is dropped and a new one
/// started. Failed fetches keep the previously published value.
pub struct Poller<T> {
    latest: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start polling. A zero `interval` is a configuration error.
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Result<Self>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(ClientError::Configuration(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let (latest_tx, latest) = watch::channel(None);
        let task = tokio::spawn(run(interval, fetch, latest_tx));
        Ok(Self { latest, task })
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.latest.clone()
    }

    pub fn latest(&self) -> Option<T> {
        self.latest.borrow().clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T, F, Fut>(period: Duration, mut fetch: F, latest: watch::Sender<Option<T>>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    info!(interval_ms = %period.as_millis(), "Started polling");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        let request = fetch();

        tokio::select! {
            biased;
            result = request => match result {
                Ok(value) => {
                    latest.send_replace(Some(value));
                }
                Err(e) => {
                    warn!(error = %e, "Poll request failed, keeping previous value");
                }
            },
            _ = ticker.tick() => {
                debug!("Poll request superseded by next tick");
                continue;
            }
        }

        ticker.tick().await;
    }
}
