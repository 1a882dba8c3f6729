//! User model for storage and API.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// User profile stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database object ID, assigned on first insert
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ObjectId>,
    /// Identity provider user ID (natural key, unique)
    #[serde(rename = "id")]
    pub external_id: String,
    /// Handle, always stored lowercase
    pub username: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub image: String,
    /// Set once the profile form has been submitted
    #[serde(default)]
    pub onboarded: bool,
    /// Threads authored by this user, oldest first
    #[serde(default)]
    pub threads: Vec<ObjectId>,
    #[serde(default)]
    pub communities: Vec<ObjectId>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Profile fields written by an onboarding or profile-edit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub external_id: String,
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub image: String,
}

impl ProfileUpdate {
    /// Build an update, normalizing the username to lowercase.
    pub fn new(
        external_id: impl Into<String>,
        username: &str,
        name: impl Into<String>,
        bio: Option<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            username: username.to_lowercase(),
            name: name.into(),
            bio,
            image: image.into(),
        }
    }
}

/// One window of a user listing.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    /// More matching users exist beyond this window
    pub is_next: bool,
}
