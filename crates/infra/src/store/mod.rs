//! Document store boundary.
//!
//! The router talks to one `ForumStore` for the lifetime of the process. Two
//! implementations exist: MongoDB (production) and an in-memory store
//! (tests/dev). Both keep `totalComments` in step with the `comments` array
//! inside a single document update.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use forumhub_core::{
    Announcement, AnnouncementText, Comment, DocumentId, Post, PostFilter, PostSummary, Report,
    User, VoteUpdate,
};

pub mod in_memory;
pub mod mongo;

pub use in_memory::InMemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced document does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("document store error: {0}")]
    Backend(#[from] mongodb::error::Error),

    #[error("document encoding failed: {0}")]
    Encode(#[from] bson::ser::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Acknowledgement of a single-document insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted_id: DocumentId,
}

/// Acknowledgement of an update (optionally an upsert).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<DocumentId>,
}

/// Acknowledgement of a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Result of the moderated comment removal cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRemoval {
    pub post_id: DocumentId,
    pub comment_removed: bool,
    pub reports_deleted: u64,
}

/// Every store operation the HTTP router issues.
#[async_trait]
pub trait ForumStore: Send + Sync {
    // Posts
    async fn search_posts(&self, filter: &PostFilter) -> StoreResult<Vec<Post>>;
    async fn distinct_tags(&self) -> StoreResult<Vec<String>>;
    /// Posts ordered by `totalUpvote` descending, at most `limit`.
    async fn top_posts(&self, limit: usize) -> StoreResult<Vec<PostSummary>>;
    async fn get_post(&self, id: DocumentId) -> StoreResult<Option<Post>>;
    async fn posts_by_author(&self, email: &str) -> StoreResult<Vec<Post>>;
    async fn insert_post(&self, post: Post) -> StoreResult<InsertOutcome>;
    async fn apply_vote(&self, id: DocumentId, vote: VoteUpdate) -> StoreResult<UpdateOutcome>;
    async fn delete_post(&self, id: DocumentId) -> StoreResult<DeleteOutcome>;

    // Comments
    /// Append a comment and recompute `totalComments`. Fails with `NotFound` if the post is absent.
    async fn add_comment(&self, post_id: DocumentId, comment: Comment) -> StoreResult<UpdateOutcome>;
    async fn find_post_by_comment(&self, comment_id: DocumentId) -> StoreResult<Option<Post>>;
    /// Pull the comment, decrement `totalComments` by one, and delete its reports.
    ///
    /// Returns `None` when no post holds the comment.
    async fn remove_comment(&self, comment_id: DocumentId) -> StoreResult<Option<CommentRemoval>>;

    // Reports
    async fn insert_report(&self, report: Report) -> StoreResult<InsertOutcome>;
    async fn list_reports(&self) -> StoreResult<Vec<Report>>;
    async fn delete_reports_for_comment(&self, comment_id: DocumentId) -> StoreResult<DeleteOutcome>;

    // Users
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: User) -> StoreResult<InsertOutcome>;
    async fn promote_to_admin(&self, user_id: DocumentId) -> StoreResult<UpdateOutcome>;

    // Announcement
    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>>;
    /// Upsert the singleton announcement document.
    async fn upsert_announcement(&self, text: AnnouncementText) -> StoreResult<UpdateOutcome>;
}

/// Shared handle used by the router.
pub type SharedStore = Arc<dyn ForumStore>;
