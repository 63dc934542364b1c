//! Debounced search over an already-fetched catalog

use crate::products::ProductService;
use crate::types::Product;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Sends search terms into a running [`SearchPipeline`]
#[derive(Clone)]
pub struct SearchHandle {
    terms: mpsc::UnboundedSender<String>,
}

impl SearchHandle {
    /// Queue a term. Returns false once the pipeline has stopped.
    pub fn submit(&self, term: impl Into<String>) -> bool {
        self.terms.send(term.into()).is_ok()
    }
}

/// Debounce, dedupe and filter pipeline
///
/// Only the last term of a burst is applied, once no new term has arrived
/// for the debounce period. A term equal to the previously applied one is
/// ignored. Results start as the full catalog.
pub struct SearchPipeline {
    handle: SearchHandle,
    results: watch::Receiver<Vec<Product>>,
    task: JoinHandle<()>,
}

impl SearchPipeline {
    pub fn spawn(products: Vec<Product>, debounce: Duration) -> Self {
        let (terms_tx, terms_rx) = mpsc::unbounded_channel();
        let (results_tx, results) = watch::channel(products.clone());

        let task = tokio::spawn(run(products, debounce, terms_rx, results_tx));

        Self {
            handle: SearchHandle { terms: terms_tx },
            results,
            task,
        }
    }

    pub fn submit(&self, term: impl Into<String>) -> bool {
        self.handle.submit(term)
    }

    pub fn handle(&self) -> SearchHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.results.clone()
    }

    /// Latest published results
    pub fn results(&self) -> Vec<Product> {
        self.results.borrow().clone()
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    products: Vec<Product>,
    debounce: Duration,
    mut terms: mpsc::UnboundedReceiver<String>,
    results: watch::Sender<Vec<Product>>,
) {
    let mut pending: Option<(String, Instant)> = None;
    let mut last_applied: Option<String> = None;

    loop {
        let deadline = pending.as_ref().map(|(_, at)| *at);

        tokio::select! {
            term = terms.recv() => match term {
                Some(term) => pending = Some((term, Instant::now() + debounce)),
                None => break,
            },
            _ = sleep_until_opt(deadline) => {
                let Some((term, _)) = pending.take() else { continue };
                if last_applied.as_deref() == Some(term.as_str()) {
                    debug!(term = %term, "Search term unchanged, skipping");
                    continue;
                }

                let matches = ProductService::search(&products, &term);
                debug!(term = %term, matches = %matches.len(), "Search applied");
                results.send_replace(matches);
                last_applied = Some(term);
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
