// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB-backed user store.
//!
//! Provides:
//! - Users (lookup, onboarding upsert, search listing)
//! - Threads (read-only population of a user's posts)

use crate::db::{collections, ConnectionManager, DbError, UserQuery, UserStore};
use crate::models::thread::{author_ids, child_ids};
use crate::models::{AuthorSummary, ProfileUpdate, Thread, User, UserPosts};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::{Collection, Database};
use std::collections::HashMap;
use std::sync::Arc;

/// User store over the shared MongoDB connection.
#[derive(Clone)]
pub struct MongoStore {
    connection: Arc<ConnectionManager>,
}

impl MongoStore {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }

    /// Ensure the connection is up, then hand out the database.
    async fn database(&self) -> Result<&Database, DbError> {
        self.connection.connect().await;
        self.connection.database()
    }

    async fn users(&self) -> Result<Collection<User>, DbError> {
        Ok(self.database().await?.collection(collections::USERS))
    }

    async fn threads(&self) -> Result<Collection<Thread>, DbError> {
        Ok(self.database().await?.collection(collections::THREADS))
    }

    /// Fetch threads by ID, keyed for population.
    async fn threads_by_id(&self, ids: Vec<ObjectId>) -> Result<HashMap<ObjectId, Thread>, DbError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let threads: Vec<Thread> = self
            .threads()
            .await?
            .find(doc! { "_id": { "$in": ids } })
            .await?
            .try_collect()
            .await?;

        Ok(threads.into_iter().map(|t| (t.id, t)).collect())
    }

    /// Fetch reply authors projected to name, image and external ID.
    async fn authors_by_id(
        &self,
        ids: Vec<ObjectId>,
    ) -> Result<HashMap<ObjectId, AuthorSummary>, DbError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let authors: Vec<AuthorSummary> = self
            .users()
            .await?
            .clone_with_type::<AuthorSummary>()
            .find(doc! { "_id": { "$in": ids } })
            .projection(doc! { "name": 1, "image": 1, "id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(authors.into_iter().map(|a| (a.object_id, a)).collect())
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn find_user(&self, external_id: &str) -> Result<Option<User>, DbError> {
        Ok(self
            .users()
            .await?
            .find_one(doc! { "id": external_id })
            .await?)
    }

    async fn upsert_user(&self, update: &ProfileUpdate) -> Result<(), DbError> {
        let now = BsonDateTime::from_chrono(chrono::Utc::now());

        let changes = doc! {
            "$set": {
                "username": update.username.as_str(),
                "name": update.name.as_str(),
                "bio": update.bio.as_deref(),
                "image": update.image.as_str(),
                "onboarded": true,
                "updated_at": now,
            },
            "$setOnInsert": {
                "threads": [],
                "communities": [],
                "created_at": now,
            },
        };

        let result = self
            .users()
            .await?
            .update_one(doc! { "id": update.external_id.as_str() }, changes)
            .upsert(true)
            .await?;

        tracing::debug!(
            external_id = %update.external_id,
            matched = result.matched_count,
            inserted = result.upserted_id.is_some(),
            "User upserted"
        );

        Ok(())
    }

    async fn find_user_posts(&self, external_id: &str) -> Result<Option<UserPosts>, DbError> {
        let Some(user) = self.find_user(external_id).await? else {
            return Ok(None);
        };

        let threads = self.threads_by_id(user.threads.clone()).await?;
        let replies = self.threads_by_id(child_ids(threads.values())).await?;
        let authors = self.authors_by_id(author_ids(replies.values())).await?;

        Ok(Some(UserPosts::populate(user, &threads, &replies, &authors)))
    }

    async fn find_users(&self, query: &UserQuery) -> Result<Vec<User>, DbError> {
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let users = self
            .users()
            .await?
            .find(query.filter())
            .sort(query.sort_document())
            .skip(query.skip)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok(users)
    }

    async fn count_users(&self, query: &UserQuery) -> Result<u64, DbError> {
        Ok(self
            .users()
            .await?
            .count_documents(query.filter())
            .await?)
    }
}
