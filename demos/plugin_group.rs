//! # Plugin registry + grouped execution
//!
//! Registers two named observer plugins and a reporter plugin, declares them
//! through the builder, then drives the tag group the way an external
//! scheduler would.
//!
//! Run with: `cargo run --example plugin_group`

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use tagpipe::{
    FnObserver, FnReporter, GroupScheduler, ObserveVia, Observer, PipelineBuilder,
    PluginRegistry, ReportVia, Reporter, TagBus,
};

fn registry() -> PluginRegistry {
    let mut reg = PluginRegistry::new();

    // A "static" observer: returns whatever its options configured.
    reg.register_observer("static", |options| {
        let value = options.get("value").cloned().unwrap_or(Value::Null);
        Ok(Arc::new(FnObserver::new(move |_data, _meta| Ok(value.clone()))) as Arc<dyn Observer>)
    });

    // An observer labelling its output with the declared tag.
    reg.register_observer("tagged", |options| {
        let tag = options
            .get("tag")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        Ok(Arc::new(FnObserver::new(move |_data, _meta| {
            Ok(json!({ "source": tag.clone(), "up": true }))
        })) as Arc<dyn Observer>)
    });

    // A stdout reporter.
    reg.register_reporter("stdout", |_options| {
        Ok(Arc::new(FnReporter::new(None, |tag, time, data| {
            println!("[stdout] {tag} @ {time}: {data}");
            Ok(data)
        })) as Arc<dyn Reporter>)
    });

    reg
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let builder = Arc::new(PipelineBuilder::new(TagBus::new(), Arc::new(registry())));

    builder.report(Some(r"probe\..*"), ReportVia::plugin("stdout"))?;
    builder.observe(
        Some("probe.static"),
        ObserveVia::plugin_with("static", json!({ "value": 42 })),
    )?;
    builder.observe(Some("probe.static"), ObserveVia::plugin("tagged"))?;

    // A typo fails right here, before any emit, naming the known plugins.
    if let Err(err) = builder.observe(Some("probe.x"), ObserveVia::plugin("statc")) {
        eprintln!("wiring error: {err}");
    }

    // An external driver would do this on a timer.
    let scheduler = GroupScheduler::new(Arc::clone(&builder));
    for _ in 0..3 {
        scheduler.run_group("probe.static").await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    Ok(())
}
