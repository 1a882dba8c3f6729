// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User search and pagination policy.
//!
//! A [`UserQuery`] is built once per listing request and used for both the
//! windowed fetch and the total count, so the two always see the same filter.

use crate::db::DbError;
use crate::models::User;
use mongodb::bson::{doc, Document};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Sort direction on the creation timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Case-insensitive literal substring match on `username` or `name`.
#[derive(Debug, Clone)]
struct SearchPattern {
    /// Escaped pattern sent to the database
    escaped: String,
    matcher: Regex,
}

/// A validated user listing: filter, sort and window.
#[derive(Debug, Clone)]
pub struct UserQuery {
    exclude_external_id: String,
    search: Option<SearchPattern>,
    pub sort: SortOrder,
    pub skip: u64,
    pub limit: u64,
}

impl UserQuery {
    /// Build the query for one page of users visible to `exclude_external_id`.
    ///
    /// `page_number` is 1-based. The requesting user is always excluded. A
    /// search string that is blank after trimming disables name matching.
    pub fn new(
        exclude_external_id: &str,
        search_string: &str,
        page_number: u64,
        page_size: u64,
        sort: SortOrder,
    ) -> Result<Self, DbError> {
        if page_number < 1 {
            return Err(DbError::InvalidQuery(
                "page number must be at least 1".to_string(),
            ));
        }
        if page_size < 1 {
            return Err(DbError::InvalidQuery(
                "page size must be at least 1".to_string(),
            ));
        }

        let skip = (page_number - 1)
            .checked_mul(page_size)
            .ok_or_else(|| DbError::InvalidQuery("page number causes overflow".to_string()))?;

        let trimmed = search_string.trim();
        let search = if trimmed.is_empty() {
            None
        } else {
            let escaped = regex::escape(trimmed);
            let matcher = RegexBuilder::new(&escaped)
                .case_insensitive(true)
                .build()
                .map_err(|e| DbError::InvalidQuery(format!("search string rejected: {}", e)))?;
            Some(SearchPattern { escaped, matcher })
        };

        Ok(Self {
            exclude_external_id: exclude_external_id.to_string(),
            search,
            sort,
            skip,
            limit: page_size,
        })
    }

    /// MongoDB filter document.
    pub fn filter(&self) -> Document {
        let mut filter = doc! { "id": { "$ne": self.exclude_external_id.as_str() } };

        if let Some(search) = &self.search {
            filter.insert(
                "$or",
                vec![
                    doc! { "username": { "$regex": search.escaped.as_str(), "$options": "i" } },
                    doc! { "name": { "$regex": search.escaped.as_str(), "$options": "i" } },
                ],
            );
        }

        filter
    }

    /// MongoDB sort document. `_id` breaks ties between equal timestamps.
    pub fn sort_document(&self) -> Document {
        let direction = self.sort.direction();
        doc! { "created_at": direction, "_id": direction }
    }

    /// Evaluate the filter against a user held in memory.
    pub fn matches(&self, user: &User) -> bool {
        if user.external_id == self.exclude_external_id {
            return false;
        }

        match &self.search {
            Some(search) => {
                search.matcher.is_match(&user.username) || search.matcher.is_match(&user.name)
            }
            None => true,
        }
    }

    /// Whether matches exist beyond this window.
    pub fn has_next(&self, total: u64, returned: usize) -> bool {
        total > self.skip.saturating_add(returned as u64)
    }
}
