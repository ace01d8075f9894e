//! Hive Server Entry Point
//!
//! Loads configuration, starts the event dispatcher and heartbeat, mounts
//! every package and serves until Ctrl-C.

use std::process::ExitCode;

use axum::Router;
use hive_api::telemetry::{init_tracing, TelemetryConfig};
use hive_api::{create_router, ApiError, HiveState, ServerConfig};
use hive_events::{spawn_heartbeat, Dispatcher};

#[tokio::main]
async fn main() -> ExitCode {
    let telemetry_config = match TelemetryConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid telemetry configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_tracing(&telemetry_config) {
        eprintln!("{}", e.message);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = %e.code, error = %e.message, "Server failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ApiError> {
    let config = ServerConfig::from_env()
        .map_err(|e| ApiError::internal_error(format!("Invalid configuration: {}", e)))?;
    tracing::debug!(?config, "Configuration loaded");

    let dispatcher = Dispatcher::spawn(config.dispatcher_config());
    let heartbeat = spawn_heartbeat(dispatcher.clone());

    let state = HiveState::new(dispatcher.clone());
    let app: Router = create_router(&state, config.auth_config(), &config.cors_origins)?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(%addr, "Starting hive server");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    heartbeat.abort();
    dispatcher.shutdown();
    dispatcher.barrier().await;
    tracing::info!(stats = ?dispatcher.stats(), "Hive server stopped");
    Ok(())
}
