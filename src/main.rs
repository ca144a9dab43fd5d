use std::future::IntoFuture;
use std::sync::Arc;

use tokio::net::TcpListener;

use tidekv::config::NodeConfig;
use tidekv::recovery;
use tidekv::server::{build_router, AppState};
use tidekv::store::KeyValueStore;
use tidekv::telemetry;
use tidekv::wal_writer::FileTransactionLog;

#[tokio::main]
async fn main() {
    telemetry::init_telemetry();

    let cfg = NodeConfig::from_env();
    tracing::info!(?cfg, "starting tidekv");

    let store = Arc::new(KeyValueStore::new());

    let mut log = match FileTransactionLog::open(&cfg.log_path, cfg.queue_capacity) {
        Ok(log) => log,
        Err(err) => {
            tracing::error!(error = %err, path = ?cfg.log_path, "cannot open transaction log");
            std::process::exit(1);
        }
    };

    // Rebuild state before anything can observe the store. A log we cannot
    // fully replay means a partially reconstructed store; refuse to serve.
    if let Err(err) = recovery::replay_log(&log, &store) {
        tracing::error!(error = %err, "transaction log replay failed; refusing to serve");
        std::process::exit(1);
    }

    log.run();
    let error_rx = log.err().expect("writer task just started");

    let state = AppState {
        store,
        log: Arc::new(log),
    };
    let app = build_router(state);

    let listener = match TcpListener::bind(cfg.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr = %cfg.bind_addr, "cannot bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!("listening on {}", cfg.bind_addr);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server error");
                std::process::exit(1);
            }
        }
        err = error_rx => {
            // Durability is gone for the rest of the process lifetime;
            // stop accepting mutations by stopping entirely.
            match err {
                Ok(err) => tracing::error!(error = %err, "transaction log writer failed; shutting down"),
                Err(_) => tracing::error!("transaction log writer vanished; shutting down"),
            }
            std::process::exit(1);
        }
    }
}
