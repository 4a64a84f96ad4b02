mod app_error;
mod cli;
mod coerce;
mod config;
mod controllers;
mod features;
mod frame;
mod repositories;
mod services;

use crate::cli::{Cli, Command};
use crate::config::config::{Config, DashboardConfig, PredictionConfig};
use crate::repositories::model_repository::ModelRepository;
use crate::repositories::rental_repository::RentalRepository;
use crate::services::delay_analytics::DelayAnalytics;
use crate::services::prediction_service::PredictionService;
use axum::Router;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    enable_logging(cli.verbose);
    let Some(config) = Config::from_path(cli.config_path) else {
        return Ok(ExitCode::FAILURE);
    };

    match cli.command.unwrap_or_default() {
        Command::Serve => serve_predictions(config.prediction()).await,
        Command::Dashboard => serve_dashboard(config.dashboard()).await,
    }
}

async fn serve_predictions(
    config: &PredictionConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let repository = ModelRepository::new(config.model_path());
    let service = match PredictionService::new(repository, config.reload_on_request()).await {
        Ok(service) => service,
        Err(err) => {
            error!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let app = controllers::predict::router(Arc::new(service));
    serve(app, &config.bind_address()).await
}

async fn serve_dashboard(config: &DashboardConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let repository = RentalRepository::new(
        config.rentals_path(),
        config.successive_path(),
        config.successive_clean_path(),
    );
    let datasets = match repository.load() {
        Ok(datasets) => datasets,
        Err(err) => {
            error!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let app = controllers::dashboard::router(Arc::new(DelayAnalytics::new(datasets)));
    serve(app, &config.bind_address()).await
}

async fn serve(app: Router, address: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let app = app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any),
    );

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(ExitCode::SUCCESS)
}

fn enable_logging(verbose: u8) {
    let log_level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
