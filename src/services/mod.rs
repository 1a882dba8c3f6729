// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod revalidation;
pub mod users;

pub use revalidation::PathRevalidator;
pub use users::{FetchUsers, UpdateUser, UserRepository, PROFILE_EDIT_PATH};
