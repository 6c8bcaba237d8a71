use std::sync::Arc;

use revoice::api::{ApiServer, ApiServerConfig, AppState};
use revoice::collaborators::Collaborators;
use revoice::config::WorkerConfig;
use revoice::logging::{LogSink, init_logging};
use revoice::pipeline::{JobDispatcher, PipelineOrchestrator, WorkerPool, WorkerPoolConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env_or_default()?;
    let (logging_config, _guard) = init_logging(&config.log_dir, "revoice.log")?;

    let shutdown = CancellationToken::new();
    logging_config.start_retention_cleanup(shutdown.clone());

    info!(
        output_dir = %config.output_dir.display(),
        workers = config.worker_count,
        queue_capacity = config.queue_capacity,
        "revoice worker starting"
    );

    let sink = Arc::new(LogSink::new());
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        Collaborators::from_config(&config),
        sink.clone(),
        config.output_dir.clone(),
    ));
    let pool = Arc::new(WorkerPool::new(
        orchestrator,
        WorkerPoolConfig {
            max_workers: config.worker_count,
            queue_capacity: config.queue_capacity,
        },
    ));
    pool.start();

    let dispatcher = JobDispatcher::new(pool.clone(), sink.clone());
    let state = AppState::new(sink, dispatcher).with_logging_config(logging_config);
    let server = ApiServer::new(ApiServerConfig::from_env_or_default()?, state);

    let server_token = server.cancel_token();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
        server_token.cancel();
    });

    let result = server.run().await;

    shutdown.cancel();
    pool.stop().await;
    info!("revoice worker stopped");

    result?;
    Ok(())
}
