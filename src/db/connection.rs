// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lazily established, process-wide MongoDB connection.
//!
//! The manager is built once at startup and shared by every store. The driver
//! pools connections internally, so a single memoized handle is enough.

use crate::config::Config;
use crate::db::{collections, DbError};
use crate::models::User;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use tokio::sync::OnceCell;

/// Connection handle provider with init-once semantics.
pub struct ConnectionManager {
    url: Option<String>,
    database_name: String,
    database: OnceCell<Database>,
}

impl ConnectionManager {
    /// Create a manager. Nothing is opened until [`connect`](Self::connect).
    pub fn new(url: Option<String>, database_name: impl Into<String>) -> Self {
        Self {
            url,
            database_name: database_name.into(),
            database: OnceCell::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.mongodb_url.clone(), config.database_name.clone())
    }

    /// Create a manager with no connection string (degraded mode).
    ///
    /// All database operations will return an error if called.
    pub fn disconnected() -> Self {
        Self::new(None, crate::config::DEFAULT_DATABASE_NAME)
    }

    /// Ensure the database handle is open.
    ///
    /// Safe to call from every entry point. Never fails: a missing connection
    /// string or a failed attempt is logged and later queries report
    /// [`DbError::NotConnected`].
    pub async fn connect(&self) {
        let Some(url) = self.url.as_deref() else {
            tracing::warn!("MONGODB_URL is not set; database access is disabled");
            return;
        };

        if self.database.initialized() {
            tracing::debug!("Using existing database connection");
            return;
        }

        let result = self
            .database
            .get_or_try_init(|| open_database(url, &self.database_name))
            .await;

        if let Err(e) = result {
            tracing::error!(
                error = %e,
                database = %self.database_name,
                "Error connecting to database"
            );
        }
    }

    /// Whether a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.database.initialized()
    }

    /// The open database handle, or `NotConnected` in degraded mode.
    pub fn database(&self) -> Result<&Database, DbError> {
        self.database.get().ok_or(DbError::NotConnected)
    }
}

/// Open a client, verify it with a ping, and prepare indexes.
async fn open_database(url: &str, database_name: &str) -> Result<Database, DbError> {
    let client = Client::with_uri_str(url).await?;
    let database = client.database(database_name);

    database.run_command(doc! { "ping": 1 }).await?;

    // The unique index backs the one-user-per-external-id invariant. Failing to
    // build it does not make the connection unusable.
    if let Err(e) = ensure_indexes(&database).await {
        tracing::warn!(error = %e, "Failed to create user indexes");
    }

    tracing::info!(database = database_name, "Using new database connection");

    Ok(database)
}

async fn ensure_indexes(database: &Database) -> Result<(), DbError> {
    let index = IndexModel::builder()
        .keys(doc! { "id": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    database
        .collection::<User>(collections::USERS)
        .create_index(index)
        .await?;

    Ok(())
}
