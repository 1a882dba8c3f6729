// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page handlers gated on onboarding.
//!
//! Every page resolves the caller's profile first and sends callers who have
//! not finished onboarding to the onboarding flow instead of rendering.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::services::PROFILE_EDIT_PATH;
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Where callers without a completed profile are sent.
pub const ONBOARDING_PATH: &str = "/onboarding";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/communities", get(communities))
        .route("/create-thread", get(create_thread))
        .route(PROFILE_EDIT_PATH, get(edit_profile))
}

/// Page payload handed to the rendering layer.
#[derive(Serialize)]
pub struct PageResponse {
    pub title: String,
    /// Object ID of the caller, used as the author of new threads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Current profile values for the edit form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileForm>,
}

#[derive(Serialize)]
pub struct ProfileForm {
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub image: String,
}

/// The caller's profile, or `None` if they must onboard first.
async fn onboarded_user(state: &AppState, user: &AuthUser) -> Result<Option<User>> {
    let profile = state.users.fetch_user(&user.external_id).await?;

    match profile {
        Some(profile) if profile.onboarded => Ok(Some(profile)),
        _ => {
            tracing::debug!(
                external_id = %user.external_id,
                "Caller not onboarded, redirecting"
            );
            Ok(None)
        }
    }
}

/// Render a page payload tagged with the path's cache generation.
fn render(state: &AppState, path: &str, page: PageResponse) -> Response {
    let etag = state.revalidator.etag(path);
    ([(header::ETAG, etag)], Json(page)).into_response()
}

fn redirect_to_onboarding() -> Response {
    Redirect::to(ONBOARDING_PATH).into_response()
}

async fn home(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    if onboarded_user(&state, &user).await?.is_none() {
        return Ok(redirect_to_onboarding());
    }

    Ok(render(
        &state,
        "/",
        PageResponse {
            title: "Home".to_string(),
            author_id: None,
            profile: None,
        },
    ))
}

async fn communities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    if onboarded_user(&state, &user).await?.is_none() {
        return Ok(redirect_to_onboarding());
    }

    Ok(render(
        &state,
        "/communities",
        PageResponse {
            title: "Community".to_string(),
            author_id: None,
            profile: None,
        },
    ))
}

async fn create_thread(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    let Some(profile) = onboarded_user(&state, &user).await? else {
        return Ok(redirect_to_onboarding());
    };

    Ok(render(
        &state,
        "/create-thread",
        PageResponse {
            title: "Create Thread".to_string(),
            author_id: profile.object_id.map(|id| id.to_hex()),
            profile: None,
        },
    ))
}

async fn edit_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    let Some(profile) = onboarded_user(&state, &user).await? else {
        return Ok(redirect_to_onboarding());
    };

    Ok(render(
        &state,
        PROFILE_EDIT_PATH,
        PageResponse {
            title: "Edit Profile".to_string(),
            author_id: None,
            profile: Some(ProfileForm {
                username: profile.username,
                name: profile.name,
                bio: profile.bio,
                image: profile.image,
            }),
        },
    ))
}
