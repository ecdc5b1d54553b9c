use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use proximity_notifier::api::{create_router, ApiState};
use proximity_notifier::cli::Cli;
use proximity_notifier::config::Config;
use proximity_notifier::error::AppError;
use proximity_notifier::logging::init_logging;
use proximity_notifier::metrics::AppMetrics;
use proximity_notifier::notify::{LogSink, WebhookSink};
use proximity_notifier::proximity::{DirectoryError, NotificationSink, PointDirectory, SinkError};
use proximity_notifier::scheduler::{start_monitoring, Scheduler};
use proximity_notifier::services::directory::HttpDirectory;
use proximity_notifier::services::location::StdinLocationProvider;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env().map(|mut config| {
        config.apply_cli(&cli);
        config
    });
    let config = match config.and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(err) => {
            init_logging("info");
            tracing::error!("{}", err);
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);
    tracing::info!("Service started with config: {:?}", config);

    if let Err(err) = run(config).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), AppError> {
    let metrics = Arc::new(AppMetrics::new()?);

    let http_directory = HttpDirectory::new(&config.directory_url, config.proximity.directory_timeout)
        .map_err(|e: DirectoryError| AppError::Config(e.to_string()))?
        .with_metrics(metrics.clone());
    tracing::info!("Fetching points of interest from {}", http_directory.base_url());
    let directory: Arc<dyn PointDirectory + Send + Sync> = Arc::new(http_directory);

    let sink: Arc<dyn NotificationSink + Send + Sync> = match &config.webhook_url {
        Some(url) => Arc::new(
            WebhookSink::new(url.as_str()).map_err(|e: SinkError| AppError::Config(e.to_string()))?,
        ),
        None => Arc::new(LogSink),
    };
    tracing::info!("Delivering notifications via {} sink", sink.sink_name());

    let scheduler = Arc::new(
        Scheduler::new(config.proximity.clone(), directory, sink).with_metrics(metrics.clone()),
    );

    if let Some(port) = config.api_port {
        let app = create_router(ApiState {
            scheduler: scheduler.clone(),
            metrics: metrics.clone(),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;
        tracing::info!("Status API listening on {}", addr);

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!("Status API stopped: {}", err);
            }
        });
    }

    let location = StdinLocationProvider::new();
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    };

    let handle = start_monitoring(scheduler, &location, shutdown).await?;
    handle
        .await
        .map_err(|e| AppError::Server(format!("Scheduler task failed: {}", e)))??;
    Ok(())
}
