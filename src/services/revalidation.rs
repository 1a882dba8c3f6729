// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache invalidation signal for rendered pages.
//!
//! Each path carries a generation number. Invalidating a path bumps it, and
//! page responses expose it as their `ETag`, so any cache in front of the
//! service sees a changed validator after a write.

use dashmap::DashMap;
use std::sync::Arc;

/// Per-path generation counters shared across requests.
#[derive(Clone, Default)]
pub struct PathRevalidator {
    generations: Arc<DashMap<String, u64>>,
}

impl PathRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate cached renderings of `path`. Returns the new generation.
    pub fn revalidate(&self, path: &str) -> u64 {
        let mut generation = self.generations.entry(path.to_string()).or_insert(0);
        *generation += 1;
        let current = *generation;
        drop(generation);

        tracing::info!(path, generation = current, "Path revalidated");
        current
    }

    /// Current generation of `path` (0 if it was never invalidated).
    pub fn generation(&self, path: &str) -> u64 {
        self.generations.get(path).map(|g| *g).unwrap_or(0)
    }

    /// `ETag` header value for the current rendering of `path`.
    pub fn etag(&self, path: &str) -> String {
        format!("\"{}\"", self.generation(path))
    }
}
