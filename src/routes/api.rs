// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db::SortOrder;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AuthorSummary, PostThread, User};
use crate::services::{FetchUsers, UpdateUser};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via session token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/me", get(get_me).put(update_me))
        .route("/api/users/{external_id}/threads", get(get_user_threads))
}

// ─── User Profile ────────────────────────────────────────────

/// User profile response.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub object_id: Option<String>,
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub image: String,
    pub onboarded: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.external_id,
            object_id: user.object_id.map(|id| id.to_hex()),
            username: user.username,
            name: user.name,
            bio: user.bio,
            image: user.image,
            onboarded: user.onboarded,
            created_at: format_utc_rfc3339(user.created_at),
        }
    }
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .users
        .fetch_user(&user.external_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.external_id)))?;

    Ok(Json(profile.into()))
}

/// Onboarding / profile-edit form submission.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 30))]
    pub username: String,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub image: String,
    /// Page the form was submitted from
    #[serde(default)]
    pub path: String,
}

/// Create or update the caller's profile.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .users
        .update_user(UpdateUser {
            external_id: user.external_id.clone(),
            username: body.username,
            name: body.name,
            bio: body.bio.filter(|b| !b.trim().is_empty()),
            image: body.image,
            path: body.path,
        })
        .await?;

    let profile = state
        .users
        .fetch_user(&user.external_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.external_id)))?;

    Ok(Json(profile.into()))
}

// ─── Directory Search ────────────────────────────────────────

#[derive(Deserialize)]
struct UsersQuery {
    /// Case-insensitive substring of username or name
    #[serde(default)]
    search: String,
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u64,
    /// Pagination: items per page
    #[serde(default = "default_page_size")]
    page_size: u64,
    #[serde(default)]
    sort: SortOrder,
}

fn default_page() -> u64 {
    1
}
fn default_page_size() -> u64 {
    crate::db::query::DEFAULT_PAGE_SIZE
}

const MAX_PAGE_SIZE: u64 = 100;
const MAX_SEARCH_LENGTH: usize = 100;

/// Compact user card for directory listings.
#[derive(Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: String,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
    pub page: u64,
    pub page_size: u64,
    pub is_next: bool,
}

/// Search other users, newest first by default.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<UsersQuery>,
) -> Result<Json<UsersResponse>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }

    if params.search.chars().count() > MAX_SEARCH_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Search must be at most {} characters",
            MAX_SEARCH_LENGTH
        )));
    }

    let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);

    tracing::debug!(
        external_id = %user.external_id,
        search = %params.search,
        page = params.page,
        page_size,
        "Searching users"
    );

    let page = state
        .users
        .fetch_users(FetchUsers {
            external_id: user.external_id,
            search_string: params.search,
            page_number: params.page,
            page_size,
            sort_by: params.sort,
        })
        .await?;

    Ok(Json(UsersResponse {
        users: page
            .users
            .into_iter()
            .map(|u| UserSummary {
                id: u.external_id,
                username: u.username,
                name: u.name,
                image: u.image,
            })
            .collect(),
        page: params.page,
        page_size,
        is_next: page.is_next,
    }))
}

// ─── User Threads ────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReplyResponse {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub author: Option<AuthorResponse>,
}

#[derive(Serialize)]
pub struct AuthorResponse {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl From<AuthorSummary> for AuthorResponse {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.external_id,
            name: author.name,
            image: author.image,
        }
    }
}

#[derive(Serialize)]
pub struct ThreadResponse {
    pub id: String,
    pub text: String,
    pub community: Option<String>,
    pub created_at: String,
    pub children: Vec<ReplyResponse>,
}

impl From<PostThread> for ThreadResponse {
    fn from(thread: PostThread) -> Self {
        Self {
            id: thread.id.to_hex(),
            text: thread.text,
            community: thread.community.map(|id| id.to_hex()),
            created_at: format_utc_rfc3339(thread.created_at),
            children: thread
                .children
                .into_iter()
                .map(|reply| ReplyResponse {
                    id: reply.id.to_hex(),
                    text: reply.text,
                    created_at: format_utc_rfc3339(reply.created_at),
                    author: reply.author.map(AuthorResponse::from),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct UserThreadsResponse {
    pub user: UserResponse,
    pub threads: Vec<ThreadResponse>,
}

/// Get a user's threads with replies and reply authors.
async fn get_user_threads(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<String>,
) -> Result<Json<UserThreadsResponse>> {
    let posts = state
        .users
        .fetch_user_posts(&external_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", external_id)))?;

    Ok(Json(UserThreadsResponse {
        user: posts.user.into(),
        threads: posts.threads.into_iter().map(ThreadResponse::from).collect(),
    }))
}
