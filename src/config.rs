use crate::models::CategoryRef;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_OUTPUT_DIR: &str = ".wooh-output";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to serialize default config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub site: String,
    #[serde(default)]
    pub openai_key: String,
    #[serde(default)]
    pub wp_user: String,
    #[serde(default)]
    pub wp_key: String,
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default = "default_cache_filename")]
    pub cache_filename: String,
    #[serde(default = "default_tracker_filename")]
    pub tracker_filename: String,
    #[serde(default)]
    pub product_meta: ProductTemplate,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Extra domain context appended to the SEO prompt, e.g. what the store sells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_context: Option<String>,
    #[serde(default = "default_cache_max_age_hours")]
    pub cache_max_age_hours: i64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_http_retries")]
    pub http_retries: u32,
}

/// Fields applied to every product created from an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTemplate {
    #[serde(rename = "type", default = "default_product_type")]
    pub product_type: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

impl Default for ProductTemplate {
    fn default() -> Self {
        Self {
            product_type: default_product_type(),
            regular_price: "0.00".into(),
            description: "Product description".into(),
            short_description: "Short Product Description".into(),
            categories: vec![CategoryRef::Int(1)],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: "domain.com".into(),
            openai_key: String::new(),
            wp_user: "user".into(),
            wp_key: String::new(),
            consumer_key: "woo_consumer_key".into(),
            consumer_secret: "woo_consumer_secret".into(),
            cache_filename: default_cache_filename(),
            tracker_filename: default_tracker_filename(),
            product_meta: ProductTemplate::default(),
            output_dir: default_output_dir(),
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            prompt_context: None,
            cache_max_age_hours: default_cache_max_age_hours(),
            max_attempts: default_max_attempts(),
            page_size: default_page_size(),
            http_retries: default_http_retries(),
        }
    }
}

impl Config {
    /// Reads the YAML config at `path`, writing the defaults there first when
    /// the file does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.write(path)?;
            println!("Config file created at {}", path.display());
            info!(target: "wooh.config", path = %path.display(), "default_config_written");
            return Ok(config);
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|key| std::env::var(key).ok());
    }

    /// Secrets can be supplied through the environment (or `.env`) instead of
    /// the YAML file; non-empty values win over the file.
    pub fn apply_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 4] = [
            ("WOOH_OPENAI_KEY", &mut self.openai_key),
            ("WOOH_WP_KEY", &mut self.wp_key),
            ("WOOH_CONSUMER_KEY", &mut self.consumer_key),
            ("WOOH_CONSUMER_SECRET", &mut self.consumer_secret),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value;
            }
        }
    }

    /// Base URL of the store. A bare host is assumed to be served over HTTPS.
    pub fn site_url(&self) -> String {
        let site = self.site.trim().trim_end_matches('/');
        if site.starts_with("http://") || site.starts_with("https://") {
            site.to_string()
        } else {
            format!("https://{site}")
        }
    }

    pub fn cache_max_age(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::hours(self.cache_max_age_hours.max(0))
    }
}

/// On-disk locations for the run, resolved once against a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub output_dir: PathBuf,
    pub cache_file: PathBuf,
    pub tracker_file: PathBuf,
}

impl RunPaths {
    pub fn resolve(config: &Config, base: &Path) -> Self {
        let output_dir = if config.output_dir.is_absolute() {
            config.output_dir.clone()
        } else {
            base.join(&config.output_dir)
        };
        Self {
            cache_file: output_dir.join(&config.cache_filename),
            tracker_file: output_dir.join(&config.tracker_filename),
            output_dir,
        }
    }

    pub fn ensure_output_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)
    }
}

fn default_product_type() -> String {
    "simple".into()
}

fn default_cache_filename() -> String {
    "products-cache.json".into()
}

fn default_tracker_filename() -> String {
    "tracker-state.json".into()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.into()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}

fn default_cache_max_age_hours() -> i64 {
    24
}

fn default_max_attempts() -> u32 {
    10
}

fn default_page_size() -> u32 {
    100
}

fn default_http_retries() -> u32 {
    3
}
