// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Threads directory API server
//!
//! Serves user lookup, onboarding and directory search for the threads app.

use std::sync::Arc;
use threads_directory::{
    config::Config,
    db::{ConnectionManager, MongoStore},
    services::{PathRevalidator, UserRepository},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting threads directory API");

    // Open the database connection up front. Failure is not fatal: queries
    // retry the connection and report errors per request.
    let connection = Arc::new(ConnectionManager::from_config(&config));
    connection.connect().await;

    let revalidator = PathRevalidator::new();
    let users = UserRepository::new(
        Arc::new(MongoStore::new(connection.clone())),
        revalidator.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        connection,
        users,
        revalidator,
    });

    // Build router
    let app = threads_directory::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("threads_directory=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
