use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SEO_TITLE_KEY: &str = "_yoast_wpseo_title";
pub const SEO_DESCRIPTION_KEY: &str = "_yoast_wpseo_metadesc";

/// A WooCommerce product as returned by `GET /wp-json/wc/v3/products`.
///
/// Only the fields this tool reads are modelled; everything else in the
/// remote payload is ignored at deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub categories: Vec<ProductCategory>,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
}

impl Product {
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl ProductCategory {
    pub fn label(&self) -> String {
        if !self.name.trim().is_empty() {
            self.name.clone()
        } else if !self.slug.trim().is_empty() {
            self.slug.clone()
        } else {
            self.id.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl MetaEntry {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            id: None,
            key: key.to_string(),
            value: Value::String(value.into()),
        }
    }
}

/// Category reference accepted by the product-creation endpoint. Config files
/// may list categories either by numeric id or by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Int(i64),
    Slug(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLink {
    pub id: CategoryRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoPair {
    pub title: String,
    pub description: String,
}

impl SeoPair {
    pub fn into_meta(self) -> Vec<MetaEntry> {
        vec![
            MetaEntry::new(SEO_TITLE_KEY, self.title),
            MetaEntry::new(SEO_DESCRIPTION_KEY, self.description),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaUpdate {
    pub meta_data: Vec<MetaEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub regular_price: String,
    pub description: String,
    pub short_description: String,
    pub categories: Vec<CategoryLink>,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub id: u64,
    pub src: String,
}

#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub path: std::path::PathBuf,
    pub title: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedMedia {
    pub id: u64,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedProduct {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}
