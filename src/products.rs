//! Product catalog client

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::poll::Poller;
use crate::search::SearchPipeline;
use crate::session::check_response;
use crate::types::Product;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Product catalog client
///
/// Every request is retried `retry_attempts` times, without backoff, before
/// the caller sees a generic [`ClientError::RetriesExhausted`].
#[derive(Clone)]
pub struct ProductService {
    config: ClientConfig,
    http_client: Client,
}

impl ProductService {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// `GET /products`
    pub async fn get_products(&self) -> Result<Vec<Product>> {
        self.get_with_retry(&self.config.endpoint("/products")).await
    }

    /// `GET /products/{id}`
    pub async fn get_product(&self, id: u64) -> Result<Product> {
        self.get_with_retry(&self.config.endpoint(&format!("/products/{id}")))
            .await
    }

    /// Poll `GET /products` at the configured interval
    pub fn poll_products(&self) -> Result<Poller<Vec<Product>>> {
        let service = self.clone();
        Poller::spawn(self.config.poll_interval, move || {
            let service = service.clone();
            async move { service.get_products().await }
        })
    }

    /// Debounced search over `products` using the configured quiet period
    pub fn search_pipeline(&self, products: Vec<Product>) -> SearchPipeline {
        SearchPipeline::spawn(products, self.config.search_debounce)
    }

    async fn get_with_retry<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let attempts = self.config.retry_attempts + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.get_once(url).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(url = %url, attempt = %attempt, error = %e, "Product request failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(ClientError::Backend { status, message }) => {
                error!(
                    url = %url,
                    status = %status,
                    body = %message.unwrap_or_default(),
                    "Backend returned an error status"
                );
            }
            Some(e) => {
                error!(url = %url, error = %e, "A client or network error occurred");
            }
            None => {}
        }

        Err(ClientError::RetriesExhausted { attempts })
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http_client.get(url).send().await?;
        check_response!(response, "Product request rejected");
        Ok(response.json().await?)
    }

    /// Filter an already-fetched list by substring on name or description
    ///
    /// An empty term returns the whole list. Matching is case sensitive.
    pub fn search(products: &[Product], term: &str) -> Vec<Product> {
        if term.is_empty() {
            return products.to_vec();
        }

        let matches: Vec<Product> = products
            .iter()
            .filter(|p| p.name.contains(term) || p.description.contains(term))
            .cloned()
            .collect();

        if matches.is_empty() {
            debug!(term = %term, "Search matched no products");
        }
        matches
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::Product;

    pub fn catalog() -> Vec<Product> {
        vec![
            Product {
                id: 1,
                name: "T-Shirt Classic".to_string(),
                price: 20.0,
                description: "A comfortable cotton t-shirt.".to_string(),
                image_url: "https://placehold.co/600x400?text=T-Shirt".to_string(),
            },
            Product {
                id: 2,
                name: "Modern Jeans".to_string(),
                price: 55.0,
                description: "High quality denim with a slim cut.".to_string(),
                image_url: "https://placehold.co/600x400?text=Jeans".to_string(),
            },
            Product {
                id: 3,
                name: "Cotton Hoodie".to_string(),
                price: 45.0,
                description: "Warm hoodie for cold days.".to_string(),
                image_url: "https://placehold.co/600x400?text=Hoodie".to_string(),
            },
        ]
    }
}
