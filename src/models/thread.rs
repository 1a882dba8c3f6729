// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thread documents and the populated view of a user's posts.
//!
//! Threads are owned by the posting side of the application; this crate only
//! reads them to resolve `user -> threads -> replies -> reply authors`.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::User;

/// Thread (top-level post or reply) stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    /// Object ID of the authoring user
    pub author: ObjectId,
    #[serde(default)]
    pub community: Option<ObjectId>,
    /// Set on replies
    #[serde(default)]
    pub parent_id: Option<ObjectId>,
    /// Replies, in posting order
    #[serde(default)]
    pub children: Vec<ObjectId>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Reply author projected to the fields a thread card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub object_id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "id")]
    pub external_id: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            object_id: user.object_id.unwrap_or_default(),
            name: user.name.clone(),
            image: user.image.clone(),
            external_id: user.external_id.clone(),
        }
    }
}

/// A reply with its author resolved.
#[derive(Debug, Clone)]
pub struct Reply {
    pub id: ObjectId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// `None` when the author document no longer exists
    pub author: Option<AuthorSummary>,
}

/// A user's thread with its replies resolved.
#[derive(Debug, Clone)]
pub struct PostThread {
    pub id: ObjectId,
    pub text: String,
    pub author: ObjectId,
    pub community: Option<ObjectId>,
    pub created_at: DateTime<Utc>,
    pub children: Vec<Reply>,
}

/// A user together with their populated threads.
#[derive(Debug, Clone)]
pub struct UserPosts {
    pub user: User,
    pub threads: Vec<PostThread>,
}

impl UserPosts {
    /// Resolve the user's thread references against already-fetched documents.
    ///
    /// Order follows the stored reference lists. References that did not
    /// resolve are dropped.
    pub fn populate(
        user: User,
        threads: &HashMap<ObjectId, Thread>,
        replies: &HashMap<ObjectId, Thread>,
        authors: &HashMap<ObjectId, AuthorSummary>,
    ) -> Self {
        let threads = user
            .threads
            .iter()
            .filter_map(|id| threads.get(id))
            .map(|thread| PostThread {
                id: thread.id,
                text: thread.text.clone(),
                author: thread.author,
                community: thread.community,
                created_at: thread.created_at,
                children: thread
                    .children
                    .iter()
                    .filter_map(|id| replies.get(id))
                    .map(|reply| Reply {
                        id: reply.id,
                        text: reply.text.clone(),
                        created_at: reply.created_at,
                        author: authors.get(&reply.author).cloned(),
                    })
                    .collect(),
            })
            .collect();

        Self { user, threads }
    }
}

/// Collect the distinct child IDs referenced by a set of threads.
pub fn child_ids<'a>(threads: impl IntoIterator<Item = &'a Thread>) -> Vec<ObjectId> {
    let mut ids: Vec<ObjectId> = threads
        .into_iter()
        .flat_map(|t| t.children.iter().copied())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Collect the distinct author IDs of a set of threads.
pub fn author_ids<'a>(threads: impl IntoIterator<Item = &'a Thread>) -> Vec<ObjectId> {
    let mut ids: Vec<ObjectId> = threads.into_iter().map(|t| t.author).collect();
    ids.sort();
    ids.dedup();
    ids
}
