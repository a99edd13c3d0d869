mod cache;
mod catalog;
mod cli;
mod config;
mod confirm;
mod http;
mod llm;
mod metrics;
mod models;
mod normalize;
mod persist;
mod pipeline;
mod retry;
mod seo;
mod tracker;
mod upload;
mod woo;

use catalog::CatalogSettings;
use clap::{CommandFactory, Parser};
use cli::Cli;
use config::{Config, RunPaths};
use confirm::{AutoApprove, Confirmer, PromptConfirmer};
use eyre::WrapErr;
use llm::{LlmClient, LlmConfig};
use pipeline::{PipelineSettings, SeoPipeline};
use seo::LlmSeoGenerator;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use woo::{WooApi, WooClient};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !cli.has_action() {
        Cli::command().print_help()?;
        return Ok(());
    }
    run(cli).await
}

async fn run(cli: Cli) -> eyre::Result<()> {
    let mut config = Config::load_or_init(&cli.config)
        .wrap_err_with(|| format!("error loading config file '{}'", cli.config.display()))?;
    config.apply_env_overrides();

    let cwd = std::env::current_dir().wrap_err("failed to resolve working directory")?;
    let paths = RunPaths::resolve(&config, &cwd);
    paths
        .ensure_output_dir()
        .wrap_err_with(|| format!("failed to create {}", paths.output_dir.display()))?;

    let http = http::build_client();
    let api: Arc<dyn WooApi> = Arc::new(WooClient::new(http.clone(), &config));
    let catalog_settings = CatalogSettings {
        cache_file: paths.cache_file.clone(),
        max_age: config.cache_max_age(),
        page_size: config.page_size,
    };

    if let Some(dir) = &cli.images_path {
        if dir.is_dir() {
            let summary = upload::upload_directory(api.as_ref(), &config.product_meta, dir).await?;
            info!(target: "wooh.upload", created = summary.created.len(), "image upload finished");
        } else {
            warn!(target: "wooh.upload", dir = %dir.display(), "images path is not a directory, skipping upload");
        }
    }

    if cli.autofill {
        let llm = LlmClient::new(http.clone(), LlmConfig::from_config(&config));
        let generator = Arc::new(LlmSeoGenerator::new(llm, config.prompt_context.clone()));
        let confirmer: Box<dyn Confirmer> = if cli.prompt {
            Box::new(PromptConfirmer::stdio())
        } else {
            Box::new(AutoApprove)
        };
        let settings = PipelineSettings {
            catalog: catalog_settings.clone(),
            tracker_file: paths.tracker_file.clone(),
            max_attempts: config.max_attempts,
        };
        let mut pipeline = SeoPipeline::new(api.clone(), generator, confirmer, settings);
        if let Err(err) = pipeline.run(cli.reset_autofill).await {
            error!(target: "wooh.seo", stage = err.stage(), kind = ?err.kind(), "seo update aborted");
            return Err(err.into());
        }
    }

    if cli.list_product_meta {
        let products = catalog::fetch_all(api.as_ref(), &catalog_settings).await?;
        print!("{}", catalog::render_meta_listing(&products));
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info,wooh=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt().with_env_filter(filter).try_init();
}
