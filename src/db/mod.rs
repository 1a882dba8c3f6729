//! Database layer (MongoDB).

pub mod connection;
pub mod memory;
pub mod mongo;
pub mod query;

pub use connection::ConnectionManager;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use query::{SortOrder, UserQuery};

use crate::models::{ProfileUpdate, User, UserPosts};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const THREADS: &str = "threads";
}

/// Storage-level failure, wrapped by the repository with the failing operation.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database not connected")]
    NotConnected,

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    #[error("malformed document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Document storage for users and the threads they reference.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by identity-provider ID.
    async fn find_user(&self, external_id: &str) -> Result<Option<User>, DbError>;

    /// Insert or update the user keyed by `update.external_id` and mark it onboarded.
    async fn upsert_user(&self, update: &ProfileUpdate) -> Result<(), DbError>;

    /// Look up a user and resolve their threads, replies and reply authors.
    async fn find_user_posts(&self, external_id: &str) -> Result<Option<UserPosts>, DbError>;

    /// Fetch one window of users matching `query`.
    async fn find_users(&self, query: &UserQuery) -> Result<Vec<User>, DbError>;

    /// Count all users matching `query`, ignoring its window.
    async fn count_users(&self, query: &UserQuery) -> Result<u64, DbError>;
}
