use crate::catalog::{self, CatalogSettings};
use crate::confirm::Confirmer;
use crate::models::{Product, SeoPair};
use crate::normalize::normalize;
use crate::retry::with_retries;
use crate::seo::{SeoGenerator, SeoInput};
use crate::tracker::UpdateTracker;
use crate::woo::WooApi;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub catalog: CatalogSettings,
    pub tracker_file: PathBuf,
    pub max_attempts: u32,
}

/// Drives the per-product SEO update: skip tracked products, normalize the
/// description, generate within the attempt cap, optionally confirm, write
/// the metadata and commit the id to the tracker.
pub struct SeoPipeline {
    api: Arc<dyn WooApi>,
    generator: Arc<dyn SeoGenerator>,
    confirmer: Box<dyn Confirmer>,
    settings: PipelineSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOutcome {
    Skipped,
    Exhausted,
    Rejected,
    Failed,
    Committed,
}

impl ProductOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ProductOutcome::Skipped => "skipped",
            ProductOutcome::Exhausted => "exhausted",
            ProductOutcome::Rejected => "rejected",
            ProductOutcome::Failed => "failed",
            ProductOutcome::Committed => "committed",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub committed: usize,
    pub skipped: usize,
    pub exhausted: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: ProductOutcome) {
        match outcome {
            ProductOutcome::Skipped => self.skipped += 1,
            ProductOutcome::Exhausted => self.exhausted += 1,
            ProductOutcome::Rejected => self.rejected += 1,
            ProductOutcome::Failed => self.failed += 1,
            ProductOutcome::Committed => self.committed += 1,
        }
    }
}

impl SeoPipeline {
    pub fn new(
        api: Arc<dyn WooApi>,
        generator: Arc<dyn SeoGenerator>,
        confirmer: Box<dyn Confirmer>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            api,
            generator,
            confirmer,
            settings,
        }
    }

    pub async fn run(&mut self, restart: bool) -> Result<RunSummary, PipelineError> {
        info!(target: "wooh.seo", restart, "starting seo update");
        let tracker = if restart {
            UpdateTracker::reset()
        } else {
            UpdateTracker::load(&self.settings.tracker_file)
                .map_err(|err| PipelineError::local_state("load_tracker", err.to_string()))?
        };

        let products = catalog::fetch_all(self.api.as_ref(), &self.settings.catalog)
            .await
            .map_err(|err| PipelineError::remote("fetch_catalog", err.to_string()))?;
        info!(target: "wooh.seo", products = products.len(), "products to be processed");

        let mut summary = RunSummary::default();
        for product in &products {
            let outcome = self.process(product, &tracker).await;
            crate::metrics::product_outcome(outcome.label(), product.id);
            summary.record(outcome);
        }
        info!(
            target: "wooh.seo",
            committed = summary.committed,
            skipped = summary.skipped,
            exhausted = summary.exhausted,
            rejected = summary.rejected,
            failed = summary.failed,
            "seo update finished"
        );
        Ok(summary)
    }

    async fn process(&mut self, product: &Product, tracker: &UpdateTracker) -> ProductOutcome {
        let product_id = product.id;
        if tracker.is_marked(product_id) {
            info!(target: "wooh.seo", product_id, "skipping product (already updated)");
            return ProductOutcome::Skipped;
        }
        info!(target: "wooh.seo", product_id, "processing product");

        let Some(pair) = self.generate(product).await else {
            return ProductOutcome::Exhausted;
        };

        if !self.confirmer.approve(product, &pair).await {
            info!(target: "wooh.seo", product_id, "update rejected at confirmation");
            return ProductOutcome::Rejected;
        }

        if let Err(err) = self
            .api
            .update_product_meta(product_id, &pair.into_meta())
            .await
        {
            warn!(target: "wooh.seo", product_id, error = %err, "failed to update seo");
            return ProductOutcome::Failed;
        }
        info!(target: "wooh.seo", product_id, "successfully updated seo");

        tracker.mark(product_id);
        tracker.save_or_warn(&self.settings.tracker_file);
        ProductOutcome::Committed
    }

    async fn generate(&self, product: &Product) -> Option<SeoPair> {
        let product_id = product.id;
        let description = normalize(&product.description);
        let input = SeoInput {
            name: &product.name,
            short_description: &product.short_description,
            description: &description,
            categories: &product.categories,
        };
        let max_attempts = self.settings.max_attempts;
        let generator = self.generator.as_ref();
        let started = Instant::now();

        let result = with_retries(
            max_attempts,
            |attempt| async move {
                let result = generator.generate(&input).await;
                if let Err(err) = &result {
                    warn!(
                        target: "wooh.seo",
                        product_id,
                        attempt,
                        max_attempts,
                        error = %err,
                        "seo generation attempt failed"
                    );
                }
                result
            },
            Result::is_ok,
        )
        .await;
        crate::metrics::stage_elapsed("generate_seo", started.elapsed().as_millis());

        match result {
            Ok(Ok(pair)) => Some(pair),
            Ok(Err(_)) => None,
            Err(exhausted) => {
                warn!(
                    target: "wooh.seo",
                    product_id,
                    attempts = exhausted.attempts,
                    "failed to generate valid meta fields, skipping product"
                );
                None
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("stage `{stage}` failed: {message}")]
pub struct PipelineError {
    stage: &'static str,
    message: String,
    kind: PipelineErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    LocalState,
    Remote,
}

impl PipelineError {
    pub fn local_state(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            kind: PipelineErrorKind::LocalState,
        }
    }

    pub fn remote(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            kind: PipelineErrorKind::Remote,
        }
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn kind(&self) -> PipelineErrorKind {
        self.kind
    }
}
