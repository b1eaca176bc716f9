use std::sync::Arc;

use klinesync::{ConnectionConfig, Updater};
use klinesync_mock::{MemoryCheckpointStore, VecSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Human-friendly tracing with env-based filtering.
    // Suggested: RUST_LOG=info,klinesync=debug,klinesync_binance=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    // In-memory collaborators keep the demo self-contained; a real deployment
    // injects its own checkpoint store and sink.
    let store = Arc::new(MemoryCheckpointStore::new());
    let sink = Arc::new(VecSink::new());

    let updater = Updater::builder()
        .connection(ConnectionConfig {
            name: "binance".into(),
            host: None,
            history_symbols: vec!["BTCUSDT".into()],
            history_intervals: vec!["15m".parse()?],
        })
        .checkpoint_store(store.clone())
        .sink(sink.clone())
        .build()?;

    // Ctrl-C stops every session cooperatively at the next page boundary.
    let cancel = updater.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    for report in updater.run().await {
        match report.result {
            Ok(summary) => println!(
                "{}: {} candles, {} anomalies, checkpoint {:?}",
                report.key, summary.fetched, summary.anomalies, summary.checkpoint
            ),
            Err(e) => eprintln!("{}: failed: {e}", report.key),
        }
    }

    Ok(())
}
