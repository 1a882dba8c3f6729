// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process user store.
//!
//! Mirrors the MongoDB store's semantics (upsert keyed on external ID, search
//! filter, creation-time ordering) so the repository and HTTP layers can run
//! without a database.

use crate::db::{DbError, SortOrder, UserQuery, UserStore};
use crate::models::thread::{author_ids, child_ids};
use crate::models::{AuthorSummary, ProfileUpdate, Thread, User, UserPosts};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;

/// User and thread documents held in memory.
#[derive(Default)]
pub struct MemoryStore {
    /// Users keyed by external ID
    users: DashMap<String, User>,
    threads: DashMap<ObjectId, Thread>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a thread and link it the way the posting flow does.
    ///
    /// Replies (`parent_id` set) are appended to the parent's children;
    /// top-level threads are appended to the author's thread list.
    pub fn insert_thread(&self, thread: Thread) {
        match thread.parent_id {
            Some(parent_id) => {
                if let Some(mut parent) = self.threads.get_mut(&parent_id) {
                    parent.children.push(thread.id);
                }
            }
            None => {
                if let Some(mut author) = self
                    .users
                    .iter_mut()
                    .find(|u| u.object_id == Some(thread.author))
                {
                    author.threads.push(thread.id);
                }
            }
        }

        self.threads.insert(thread.id, thread);
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn threads_by_id(&self, ids: &[ObjectId]) -> HashMap<ObjectId, Thread> {
        ids.iter()
            .filter_map(|id| self.threads.get(id).map(|t| (*id, t.value().clone())))
            .collect()
    }

    fn authors_by_id(&self, ids: &[ObjectId]) -> HashMap<ObjectId, AuthorSummary> {
        self.users
            .iter()
            .filter_map(|u| {
                let object_id = u.object_id?;
                ids.contains(&object_id)
                    .then(|| (object_id, AuthorSummary::from(u.value())))
            })
            .collect()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, external_id: &str) -> Result<Option<User>, DbError> {
        Ok(self.users.get(external_id).map(|u| u.value().clone()))
    }

    async fn upsert_user(&self, update: &ProfileUpdate) -> Result<(), DbError> {
        let now = Utc::now();

        self.users
            .entry(update.external_id.clone())
            .and_modify(|user| {
                user.username = update.username.clone();
                user.name = update.name.clone();
                user.bio = update.bio.clone();
                user.image = update.image.clone();
                user.onboarded = true;
                user.updated_at = now;
            })
            .or_insert_with(|| User {
                object_id: Some(ObjectId::new()),
                external_id: update.external_id.clone(),
                username: update.username.clone(),
                name: update.name.clone(),
                bio: update.bio.clone(),
                image: update.image.clone(),
                onboarded: true,
                threads: Vec::new(),
                communities: Vec::new(),
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn find_user_posts(&self, external_id: &str) -> Result<Option<UserPosts>, DbError> {
        let Some(user) = self.find_user(external_id).await? else {
            return Ok(None);
        };

        let threads = self.threads_by_id(&user.threads);
        let replies = self.threads_by_id(&child_ids(threads.values()));
        let authors = self.authors_by_id(&author_ids(replies.values()));

        Ok(Some(UserPosts::populate(user, &threads, &replies, &authors)))
    }

    async fn find_users(&self, query: &UserQuery) -> Result<Vec<User>, DbError> {
        let mut matching: Vec<User> = self
            .users
            .iter()
            .filter(|u| query.matches(u.value()))
            .map(|u| u.value().clone())
            .collect();

        matching.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.object_id.cmp(&b.object_id))
        });
        if query.sort == SortOrder::Desc {
            matching.reverse();
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        Ok(matching.into_iter().skip(skip).take(limit).collect())
    }

    async fn count_users(&self, query: &UserQuery) -> Result<u64, DbError> {
        Ok(self.users.iter().filter(|u| query.matches(u.value())).count() as u64)
    }
}
