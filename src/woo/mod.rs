//! WooCommerce and WordPress REST clients.

pub mod media;
pub mod products;

#[cfg(test)]
pub mod testing;

use crate::config::Config;
use crate::models::{
    CreatedProduct, MediaUpload, MetaEntry, NewProduct, Product, UploadedMedia,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum WooError {
    #[error("network error: {0}")]
    Network(String),
    #[error("remote error: HTTP {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport failures may succeed on a second try; malformed requests will not.
/// Only for requests that are safe to repeat.
fn is_transport_error(err: &reqwest::Error) -> bool {
    !err.is_builder() && !err.is_status()
}

/// Failures where the request never reached the server. The only retryable
/// case for requests that create remote resources.
fn is_connect_error(err: &reqwest::Error) -> bool {
    err.is_connect()
}

/// Remote operations the SEO pipeline and the image uploader rely on.
#[async_trait]
pub trait WooApi: Send + Sync {
    async fn list_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError>;

    async fn update_product_meta(
        &self,
        product_id: u64,
        meta: &[MetaEntry],
    ) -> Result<(), WooError>;

    async fn upload_media(&self, upload: &MediaUpload) -> Result<UploadedMedia, WooError>;

    async fn create_product(&self, product: &NewProduct) -> Result<CreatedProduct, WooError>;
}

#[derive(Debug, Clone)]
pub struct WooCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub wp_user: String,
    pub wp_key: String,
}

#[derive(Clone)]
pub struct WooClient {
    http: Client,
    base_url: String,
    credentials: WooCredentials,
    retries: u32,
}

impl WooClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.site_url(),
            credentials: WooCredentials {
                consumer_key: config.consumer_key.clone(),
                consumer_secret: config.consumer_secret.clone(),
                wp_user: config.wp_user.clone(),
                wp_key: config.wp_key.clone(),
            },
            retries: config.http_retries,
        }
    }

    fn products_url(&self) -> String {
        format!("{}/wp-json/wc/v3/products", self.base_url)
    }

    fn product_url(&self, product_id: u64) -> String {
        format!("{}/wp-json/wc/v3/products/{product_id}", self.base_url)
    }

    fn media_url(&self) -> String {
        format!("{}/wp-json/wp/v2/media", self.base_url)
    }

    fn auth_query(&self) -> [(&'static str, &str); 2] {
        [
            ("consumer_key", self.credentials.consumer_key.as_str()),
            ("consumer_secret", self.credentials.consumer_secret.as_str()),
        ]
    }
}

#[async_trait]
impl WooApi for WooClient {
    async fn list_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError> {
        self.fetch_products_page(page, per_page).await
    }

    async fn update_product_meta(
        &self,
        product_id: u64,
        meta: &[MetaEntry],
    ) -> Result<(), WooError> {
        self.put_product_meta(product_id, meta).await
    }

    async fn upload_media(&self, upload: &MediaUpload) -> Result<UploadedMedia, WooError> {
        self.post_media(upload).await
    }

    async fn create_product(&self, product: &NewProduct) -> Result<CreatedProduct, WooError> {
        self.post_product(product).await
    }
}

async fn check_status(response: Response) -> Result<Response, WooError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(WooError::Remote {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, WooError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| WooError::Network(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| WooError::Decode(err.to_string()))
}
