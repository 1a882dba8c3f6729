// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Threads directory: user lookup, onboarding and search for a social-posting app.
//!
//! This crate provides the user directory backend: profile upserts on
//! onboarding, paginated user search, and the relational fetch of a user's
//! threads with their replies.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ConnectionManager;
use services::{PathRevalidator, UserRepository};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub connection: Arc<ConnectionManager>,
    pub users: UserRepository,
    pub revalidator: PathRevalidator,
}
