// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User repository: lookup, onboarding upsert, posts and directory search.
//!
//! Every operation reports failures as a [`RepositoryError`] naming the
//! operation, with the storage error preserved as its source.

use crate::db::query::DEFAULT_PAGE_SIZE;
use crate::db::{DbError, SortOrder, UserQuery, UserStore};
use crate::error::{Operation, RepositoryError};
use crate::models::{ProfileUpdate, User, UserPage, UserPosts};
use crate::services::PathRevalidator;
use std::sync::Arc;

/// The only path whose cached rendering is invalidated by a profile write.
pub const PROFILE_EDIT_PATH: &str = "/profile/edit";

/// Onboarding or profile-edit submission.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub external_id: String,
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub image: String,
    /// Route the submission came from, used as a cache-invalidation hint
    pub path: String,
}

/// Parameters of a directory listing.
#[derive(Debug, Clone)]
pub struct FetchUsers {
    /// The requesting user, never included in results
    pub external_id: String,
    pub search_string: String,
    /// 1-based
    pub page_number: u64,
    pub page_size: u64,
    pub sort_by: SortOrder,
}

impl FetchUsers {
    /// First page, default size, newest first, no search.
    pub fn for_user(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            search_string: String::new(),
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortOrder::Desc,
        }
    }
}

/// User operations over an injected store.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
    revalidator: PathRevalidator,
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>, revalidator: PathRevalidator) -> Self {
        Self { store, revalidator }
    }

    /// Fetch a user by external ID. A missing user is `Ok(None)`.
    pub async fn fetch_user(&self, external_id: &str) -> Result<Option<User>, RepositoryError> {
        self.store
            .find_user(external_id)
            .await
            .map_err(|e| failed(Operation::FetchUser, e))
    }

    /// Create or update the user's profile and mark them onboarded.
    ///
    /// `onboarded` is set on every call, so an edit re-asserts it. After a
    /// successful write the profile-edit page is revalidated when the
    /// submission came from it.
    pub async fn update_user(&self, params: UpdateUser) -> Result<(), RepositoryError> {
        let update = ProfileUpdate::new(
            params.external_id,
            &params.username,
            params.name,
            params.bio,
            params.image,
        );

        self.store
            .upsert_user(&update)
            .await
            .map_err(|e| failed(Operation::UpdateUser, e))?;

        tracing::info!(external_id = %update.external_id, "User profile saved");

        if params.path == PROFILE_EDIT_PATH {
            self.revalidator.revalidate(&params.path);
        }

        Ok(())
    }

    /// Fetch a user with threads, replies and reply authors resolved.
    pub async fn fetch_user_posts(
        &self,
        external_id: &str,
    ) -> Result<Option<UserPosts>, RepositoryError> {
        self.store
            .find_user_posts(external_id)
            .await
            .map_err(|e| failed(Operation::FetchUserPosts, e))
    }

    /// Fetch one page of other users, optionally filtered by a search string.
    pub async fn fetch_users(&self, params: FetchUsers) -> Result<UserPage, RepositoryError> {
        let query = UserQuery::new(
            &params.external_id,
            &params.search_string,
            params.page_number,
            params.page_size,
            params.sort_by,
        )
        .map_err(|e| failed(Operation::FetchUsers, e))?;

        let (users, total) = tokio::try_join!(
            self.store.find_users(&query),
            self.store.count_users(&query)
        )
        .map_err(|e| failed(Operation::FetchUsers, e))?;

        let is_next = query.has_next(total, users.len());

        tracing::debug!(
            external_id = %params.external_id,
            page = params.page_number,
            returned = users.len(),
            total,
            is_next,
            "Fetched users"
        );

        Ok(UserPage { users, is_next })
    }
}

/// Wrap and log a storage failure.
fn failed(operation: Operation, cause: DbError) -> RepositoryError {
    let err = RepositoryError::new(operation, cause);
    if err.is_invalid_query() {
        tracing::warn!(error = %err, "Rejected user repository request");
    } else {
        tracing::error!(error = %err, "User repository operation failed");
    }
    err
}
