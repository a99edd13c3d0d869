//! Time-stamped on-disk snapshot of the product catalog.

use crate::models::Product;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse cache file: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub last_update: DateTime<Utc>,
}

/// Returns the stored snapshot while it is younger than `max_age`. A missing
/// file, an expired snapshot or one stamped in the future is `None`.
pub fn load(path: &Path, max_age: TimeDelta) -> Result<Option<CatalogSnapshot>, CacheError> {
    load_at(path, max_age, Utc::now())
}

pub fn load_at(
    path: &Path,
    max_age: TimeDelta,
    now: DateTime<Utc>,
) -> Result<Option<CatalogSnapshot>, CacheError> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let snapshot: CatalogSnapshot = serde_json::from_slice(&raw)?;
    let age = now - snapshot.last_update;
    if age < TimeDelta::zero() || age > max_age {
        debug!(target: "wooh.cache", age_secs = age.num_seconds(), "cache_expired");
        return Ok(None);
    }
    info!(target: "wooh.cache", products = snapshot.products.len(), "returning products from cache");
    Ok(Some(snapshot))
}

/// Replaces the cache with `products`. Failures are logged and swallowed: the
/// caller still holds the fetched data in memory.
pub fn store(path: &Path, products: &[Product]) {
    if let Err(err) = store_at(path, products, Utc::now()) {
        warn!(target: "wooh.cache", path = %path.display(), error = %err, "could not save cache file");
    }
}

pub fn store_at(path: &Path, products: &[Product], now: DateTime<Utc>) -> Result<(), CacheError> {
    let snapshot = CatalogSnapshot {
        products: products.to_vec(),
        last_update: now,
    };
    let data = serde_json::to_vec(&snapshot)?;
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    crate::persist::write_atomic(path, &data)?;
    Ok(())
}
