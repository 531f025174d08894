//! shellhost - Main Entry Point
//! JSON-RPC server exposing shell execution and file tools

mod config;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{DaemonConfig, LogFormat};
use shellhost_api_rpc::{RpcServer, RpcServerConfig};
use shellhost_core::application::{
    FileMutationGuard, FileService, ProcessRegistry, SearchService, ShellService,
};
use shellhost_core::domain::ExecutionStatus;
use shellhost_infra_system::{BashRunner, LocalFileSystem, LocalSearch};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("shellhost=info"))?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

/// Kill background shells that are still running
async fn terminate_running(shell: &ShellService) {
    for summary in shell.list() {
        if summary.status != ExecutionStatus::Running {
            continue;
        }
        if let Err(e) = shell.terminate(&summary.id).await {
            warn!(shell_id = %summary.id, error = %e, "Failed to terminate on shutdown");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    init_logging(config.log_format)?;
    info!("shellhost v{} starting...", VERSION);
    info!(
        workdir = %config.workdir.display(),
        rg_path = %config.rg_path.display(),
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let runner = Arc::new(BashRunner::new().with_workdir(&config.workdir));
    let shell = Arc::new(ShellService::new(runner, ProcessRegistry::global()));

    let files = Arc::new(FileService::new(
        Arc::new(LocalFileSystem::new()),
        Arc::new(FileMutationGuard::new()),
    ));

    let search = Arc::new(SearchService::new(
        Arc::new(LocalSearch::new(&config.rg_path, &config.workdir)),
        &config.workdir,
    ));

    // 4. Start JSON-RPC server
    let rpc_server = RpcServer::new(
        RpcServerConfig {
            host: config.rpc_host.clone(),
            port: config.rpc_port,
        },
        shell.clone(),
        files,
        search,
    );
    let (addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    terminate_running(&shell).await;

    info!("Shutdown complete.");
    Ok(())
}
