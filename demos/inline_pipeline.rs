//! # Inline-closure pipeline
//!
//! Wires a complete pipeline from closures alone:
//! - an observer that fakes a latency probe
//! - a translator that converts milliseconds to seconds
//! - a reporter subscribed to everything under `svc.`
//!
//! Run with: `cargo run --example inline_pipeline`

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use tagpipe::{ObserveVia, PipelineBuilder, PluginRegistry, ReportVia, TagBus, TranslateVia};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let builder = PipelineBuilder::new(TagBus::new(), Arc::new(PluginRegistry::new()));

    // Reporter first, so it is subscribed before anything emits.
    builder.report(
        Some(r"svc\..*"),
        ReportVia::func(|tag, time, data| {
            println!("[report] {tag} @ {time}: {data}");
            Ok(data)
        }),
    )?;

    // observe → translate → emit, assembled by hand.
    let probe = builder.observe(None, ObserveVia::func(|_data, _meta| Ok(json!(250))))?;
    let to_seconds = builder.translate(TranslateVia::func(|_tag, _time, data| {
        let ms = data.as_f64().unwrap_or(0.0);
        Ok(json!(ms / 1000.0))
    }))?;
    let pipeline = probe
        .then(to_seconds)
        .then(Arc::clone(builder.bus()).emit_task("svc.latency"));

    pipeline.execute(tagpipe::Record::empty()).await?;

    // Direct emission works too; the observer chain is just one producer.
    builder
        .bus()
        .emit("svc.errors", Utc::now(), json!({ "count": 3 }))
        .await?;

    Ok(())
}
