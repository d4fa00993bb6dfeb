//! Document store ports.
//!
//! Mutations that depend on prior state (vote toggles, owner-checked
//! updates) are expressed as conditional operations so adapters can execute
//! them as a single atomic update against the store. Lookups that miss
//! return `Ok(None)` / `Ok(false)`; `Err` is reserved for store faults.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, User, VoteOutcome};
use crate::error::StoreError;

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub total_count: u64,
}

/// Post collection port.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: Post) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// All posts, newest first. `page` starts at 1.
    async fn list(&self, page: u64, limit: u64) -> Result<Page<Post>, StoreError>;

    /// Posts owned by `email`, newest first.
    async fn list_by_owner(
        &self,
        email: &str,
        page: u64,
        limit: u64,
    ) -> Result<Page<Post>, StoreError>;

    /// Case-insensitive substring match on title, newest first.
    async fn search_by_title(&self, query: &str) -> Result<Vec<Post>, StoreError>;

    /// Posts sorted by vote count descending, ties broken by recency.
    async fn top_rated(&self, page: u64, limit: u64) -> Result<Page<Post>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Owner-checked content update. Returns `false` when the post does not
    /// exist *or* is not owned by `owner_email` - callers cannot tell which.
    async fn update_content(
        &self,
        id: Uuid,
        owner_email: &str,
        title: &str,
        description: &str,
    ) -> Result<bool, StoreError>;

    /// Owner-checked delete, same not-found/not-owner collapse as
    /// [`update_content`](PostStore::update_content).
    async fn delete(&self, id: Uuid, owner_email: &str) -> Result<bool, StoreError>;

    /// Append a comment. Returns `false` when the post does not exist.
    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<bool, StoreError>;

    /// Append a reply; the update is conditioned on `parent_id` existing in
    /// the post's comment sequence. The comment must carry
    /// `parent_id == Some(parent_id)`.
    async fn add_reply(
        &self,
        post_id: Uuid,
        parent_id: Uuid,
        comment: Comment,
    ) -> Result<bool, StoreError>;

    /// Atomically flip `voter`'s vote on the post. `None` when the post does
    /// not exist; no mutation occurs in that case.
    async fn toggle_post_vote(
        &self,
        post_id: Uuid,
        voter: &str,
    ) -> Result<Option<VoteOutcome>, StoreError>;

    /// Atomically flip `voter`'s vote on one comment of the post, never
    /// touching sibling comments. `None` when post or comment is missing.
    async fn toggle_comment_vote(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        voter: &str,
    ) -> Result<Option<VoteOutcome>, StoreError>;
}

/// Field changes for a profile update. `password_hash == None` keeps the
/// current hash.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub password_hash: Option<String>,
}

/// User collection port.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Update the user identified by `current_email`. Returns `false` when
    /// no such user exists.
    async fn update(&self, current_email: &str, changes: UserUpdate) -> Result<bool, StoreError>;
}
