// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use threads_directory::config::Config;
use threads_directory::db::{ConnectionManager, MemoryStore, MongoStore};
use threads_directory::middleware::auth::create_jwt;
use threads_directory::routes::create_router;
use threads_directory::services::{PathRevalidator, UpdateUser, UserRepository};
use threads_directory::AppState;

/// Check if a MongoDB instance is available via environment variable.
#[allow(dead_code)]
pub fn mongo_available() -> bool {
    std::env::var("MONGODB_URL").is_ok()
}

/// Skip test with message if MongoDB not available.
#[macro_export]
macro_rules! require_mongo {
    () => {
        if !crate::common::mongo_available() {
            eprintln!("⚠️  Skipping: MONGODB_URL not set");
            return;
        }
    };
}

/// Generate a unique suffix for test isolation.
#[allow(dead_code)]
pub fn unique_suffix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

/// Connect to the MongoDB instance named by `MONGODB_URL`, using a fresh database.
#[allow(dead_code)]
pub async fn test_mongo() -> (Arc<ConnectionManager>, MongoStore) {
    let url = std::env::var("MONGODB_URL").ok();
    let connection = Arc::new(ConnectionManager::new(
        url,
        format!("threads_test_{}", unique_suffix()),
    ));
    connection.connect().await;
    assert!(connection.is_connected(), "Failed to connect to MongoDB");

    let store = MongoStore::new(connection.clone());
    (connection, store)
}

/// Repository over an in-memory store.
#[allow(dead_code)]
pub fn memory_repository() -> (UserRepository, Arc<MemoryStore>, PathRevalidator) {
    let store = Arc::new(MemoryStore::new());
    let revalidator = PathRevalidator::new();
    let repo = UserRepository::new(store.clone(), revalidator.clone());
    (repo, store, revalidator)
}

/// Create a test app over an in-memory store.
/// Returns the router, the shared state and the store for seeding.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let config = Config::test_default();
    let (users, store, revalidator) = memory_repository();

    let state = Arc::new(AppState {
        config,
        connection: Arc::new(ConnectionManager::disconnected()),
        users,
        revalidator,
    });

    (create_router(state.clone()), state, store)
}

/// Create a test app whose database is unreachable.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let connection = Arc::new(ConnectionManager::disconnected());
    let revalidator = PathRevalidator::new();
    let users = UserRepository::new(
        Arc::new(MongoStore::new(connection.clone())),
        revalidator.clone(),
    );

    let state = Arc::new(AppState {
        config,
        connection,
        users,
        revalidator,
    });

    (create_router(state.clone()), state)
}

/// Create a session token for a test user.
#[allow(dead_code)]
pub fn create_test_jwt(external_id: &str, signing_key: &[u8]) -> String {
    create_jwt(external_id, signing_key).expect("Failed to create test JWT")
}

/// Profile submission with sensible defaults.
#[allow(dead_code)]
pub fn profile(external_id: &str, username: &str, name: &str) -> UpdateUser {
    UpdateUser {
        external_id: external_id.to_string(),
        username: username.to_string(),
        name: name.to_string(),
        bio: Some("hello".to_string()),
        image: format!("https://img.example.com/{}.png", external_id),
        path: "/onboarding".to_string(),
    }
}

/// Seed `count` onboarded users named `user_0..user_{count-1}`.
#[allow(dead_code)]
pub async fn seed_users(repo: &UserRepository, count: usize) {
    for i in 0..count {
        let id = format!("user_{}", i);
        repo.update_user(profile(&id, &format!("member{}", i), &format!("Member {}", i)))
            .await
            .unwrap();
    }
}
