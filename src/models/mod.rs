// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod thread;
pub mod user;

pub use thread::{AuthorSummary, PostThread, Reply, Thread, UserPosts};
pub use user::{ProfileUpdate, User, UserPage};
