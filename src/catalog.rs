use crate::cache;
use crate::models::{Product, SEO_DESCRIPTION_KEY, SEO_TITLE_KEY};
use crate::woo::{WooApi, WooError};
use chrono::TimeDelta;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Largest `per_page` the store honours; bigger requests come back capped.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
#[error("failed to fetch products on page {page}: {source}")]
pub struct CatalogError {
    pub page: u32,
    #[source]
    pub source: WooError,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub cache_file: PathBuf,
    pub max_age: TimeDelta,
    pub page_size: u32,
}

/// Returns the whole catalog, from the cache while it is fresh, otherwise by
/// paging through the store. Pagination stops at the first page shorter than
/// `page_size`, so a catalog that is an exact multiple of the page size costs
/// one extra, empty request. Any failed page aborts the fetch and nothing is
/// cached.
pub async fn fetch_all(
    api: &dyn WooApi,
    settings: &CatalogSettings,
) -> Result<Vec<Product>, CatalogError> {
    match cache::load(&settings.cache_file, settings.max_age) {
        Ok(Some(snapshot)) => return Ok(snapshot.products),
        Ok(None) => {}
        Err(err) => {
            warn!(target: "wooh.catalog", error = %err, "cache unusable, fetching from api");
        }
    }

    info!(target: "wooh.catalog", "fetching all products from api (paginated)");
    let started = Instant::now();
    let page_size = settings.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut products = Vec::new();
    let mut page = 1;
    loop {
        let batch = api
            .list_products(page, page_size)
            .await
            .map_err(|source| CatalogError { page, source })?;
        let fetched = batch.len();
        products.extend(batch);
        info!(target: "wooh.catalog", page, fetched, total = products.len(), "page_fetched");
        if fetched < page_size as usize {
            break;
        }
        page += 1;
    }
    crate::metrics::stage_elapsed("fetch_catalog", started.elapsed().as_millis());

    cache::store(&settings.cache_file, &products);
    Ok(products)
}

/// Human-readable listing of each product's current SEO metadata.
pub fn render_meta_listing(products: &[Product]) -> String {
    let mut out = String::new();
    for product in products {
        let _ = writeln!(out, "ID: {}", product.id);
        let _ = writeln!(out, "Name: {}", product.name);
        if let Some(title) = product.meta_value(SEO_TITLE_KEY) {
            let _ = writeln!(out, "Yoast Title: {}", display_value(title));
        }
        if let Some(description) = product.meta_value(SEO_DESCRIPTION_KEY) {
            let _ = writeln!(out, "Yoast Meta Description: {}", display_value(description));
        }
        out.push('\n');
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
