use tracing::trace;

// Counters and timings are emitted as trace events; a subscriber at
// `wooh.metrics=trace` picks them up.

pub fn stage_elapsed(stage: &'static str, elapsed_ms: u128) {
    trace!(
        target: "wooh.metrics",
        stage = stage,
        elapsed_ms = elapsed_ms as u64,
        "stage_elapsed"
    );
}

pub fn product_outcome(outcome: &'static str, product_id: u64) {
    trace!(
        target: "wooh.metrics",
        outcome = outcome,
        product_id = product_id,
        "product_outcome_inc"
    );
}

pub fn upload_completed(file: &str, product_id: u64) {
    trace!(
        target: "wooh.metrics",
        file = file,
        product_id = product_id,
        "uploads_total_inc"
    );
}
