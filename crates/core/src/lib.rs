//! `forumhub-core`: forum document types and pure domain helpers.
//!
//! This crate contains **pure domain** code (no store or HTTP concerns).

pub mod announcement;
pub mod error;
mod extra;
pub mod id;
pub mod post;
pub mod report;
pub mod user;

pub use announcement::{Announcement, AnnouncementText};
pub use error::{DomainError, DomainResult};
pub use id::DocumentId;
pub use post::{
    categories_with_all, Comment, NewComment, NewPost, Post, PostFilter, PostSummary, VoteUpdate,
    ALL_CATEGORIES, TOP_POSTS_LIMIT,
};
pub use report::{NewReport, Report};
pub use user::{NewUser, User, ADMIN};
