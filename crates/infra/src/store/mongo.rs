//! MongoDB-backed document store.
//!
//! One `Client` (with its internal connection pool) is opened at startup and
//! shared by every request. Timeouts and retries are the driver's defaults.
//!
//! ## Consistency
//!
//! Comment insertion and moderated removal each touch a single post document in
//! one update, so `comments` and `totalComments` never diverge. The removal
//! cascade also deletes reports from a second collection; with
//! `transactions = true` both writes share a session transaction, otherwise the
//! report deletion runs after the post update and can be lost on failure.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    results::{DeleteResult, UpdateResult},
    Client, Collection, Database,
};
use tracing::instrument;

use forumhub_core::{
    Announcement, AnnouncementText, Comment, DocumentId, Post, PostFilter, PostSummary, Report,
    User, VoteUpdate, ADMIN,
};

use super::{
    CommentRemoval, DeleteOutcome, ForumStore, InsertOutcome, StoreError, StoreResult,
    UpdateOutcome,
};
use crate::config::DatabaseSettings;

pub const POSTS: &str = "PostsInfo";
pub const USERS: &str = "UsersInfo";
pub const REPORTS: &str = "ReportsInfo";
pub const ANNOUNCEMENT: &str = "Announcement";

#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
    transactions: bool,
}

impl MongoStore {
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let uri = settings.connection_uri();
        let mut options = ClientOptions::parse(uri.as_str()).await?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name = Some("forumhub".to_string());

        let client = Client::with_options(options)?;
        let db = client.database(&settings.name);
        tracing::info!(database = %settings.name, transactions = settings.transactions, "document store client ready");

        Ok(Self {
            client,
            db,
            transactions: settings.transactions,
        })
    }

    /// Round-trip a `ping` to check that the cluster is reachable and accepts the credentials.
    pub async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn posts(&self) -> Collection<Post> {
        self.db.collection(POSTS)
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(USERS)
    }

    fn reports(&self) -> Collection<Report> {
        self.db.collection(REPORTS)
    }

    fn announcements(&self) -> Collection<Announcement> {
        self.db.collection(ANNOUNCEMENT)
    }
}

/// Title is matched as a literal, case-insensitive substring.
pub(crate) fn post_filter_document(filter: &PostFilter) -> Document {
    let mut query = Document::new();
    if let Some(title) = filter.title_contains() {
        query.insert(
            "postTitle",
            doc! { "$regex": regex::escape(title), "$options": "i" },
        );
    }
    if let Some(tag) = filter.tag() {
        query.insert("tag", tag);
    }
    query
}

fn object_id(value: &Bson) -> Option<DocumentId> {
    value.as_object_id().map(DocumentId::from)
}

fn update_outcome(result: UpdateResult) -> UpdateOutcome {
    UpdateOutcome {
        matched_count: result.matched_count,
        modified_count: result.modified_count,
        upserted_id: result.upserted_id.as_ref().and_then(object_id),
    }
}

fn delete_outcome(result: DeleteResult) -> DeleteOutcome {
    DeleteOutcome {
        deleted_count: result.deleted_count,
    }
}

#[async_trait]
impl ForumStore for MongoStore {
    #[instrument(skip(self))]
    async fn search_posts(&self, filter: &PostFilter) -> StoreResult<Vec<Post>> {
        let cursor = self.posts().find(post_filter_document(filter)).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn distinct_tags(&self) -> StoreResult<Vec<String>> {
        let values = self.posts().distinct("tag", doc! {}).await?;
        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn top_posts(&self, limit: usize) -> StoreResult<Vec<PostSummary>> {
        let cursor = self
            .posts()
            .clone_with_type::<PostSummary>()
            .find(doc! {})
            .sort(doc! { "totalUpvote": -1 })
            .limit(limit as i64)
            .projection(doc! {
                "postID": 1,
                "authorName": 1,
                "postTitle": 1,
                "totalUpvote": 1,
                "totalComments": 1,
                "tag": 1
            })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_post(&self, id: DocumentId) -> StoreResult<Option<Post>> {
        Ok(self.posts().find_one(doc! { "_id": id }).await?)
    }

    async fn posts_by_author(&self, email: &str) -> StoreResult<Vec<Post>> {
        let cursor = self.posts().find(doc! { "authorEmail": email }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip_all)]
    async fn insert_post(&self, mut post: Post) -> StoreResult<InsertOutcome> {
        let id = *post.id.get_or_insert_with(DocumentId::new);
        self.posts().insert_one(&post).await?;
        Ok(InsertOutcome { inserted_id: id })
    }

    #[instrument(skip(self))]
    async fn apply_vote(&self, id: DocumentId, vote: VoteUpdate) -> StoreResult<UpdateOutcome> {
        let set = bson::to_document(&vote)?;
        let result = self
            .posts()
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(update_outcome(result))
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, id: DocumentId) -> StoreResult<DeleteOutcome> {
        let result = self.posts().delete_one(doc! { "_id": id }).await?;
        Ok(delete_outcome(result))
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id))]
    async fn add_comment(&self, post_id: DocumentId, comment: Comment) -> StoreResult<UpdateOutcome> {
        let comment_doc = bson::to_document(&comment)?;
        // Pipeline update: append and recount in one atomic document write.
        let pipeline = vec![
            doc! { "$set": { "comments": { "$concatArrays": [
                { "$ifNull": ["$comments", []] },
                [ { "$literal": comment_doc } ]
            ] } } },
            doc! { "$set": { "totalComments": { "$size": "$comments" } } },
        ];
        let result = self
            .posts()
            .update_one(doc! { "_id": post_id }, pipeline)
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound("post"));
        }
        Ok(update_outcome(result))
    }

    async fn find_post_by_comment(&self, comment_id: DocumentId) -> StoreResult<Option<Post>> {
        Ok(self
            .posts()
            .find_one(doc! { "comments.commentID": comment_id })
            .await?)
    }

    #[instrument(skip(self))]
    async fn remove_comment(&self, comment_id: DocumentId) -> StoreResult<Option<CommentRemoval>> {
        let Some(post) = self.find_post_by_comment(comment_id).await? else {
            return Ok(None);
        };
        let post_id = post.id.ok_or(StoreError::NotFound("post id"))?;

        // Matching on the comment too keeps a concurrent second removal from decrementing twice.
        let post_filter = doc! { "_id": post_id, "comments.commentID": comment_id };
        let post_update = doc! {
            "$pull": { "comments": { "commentID": comment_id } },
            "$inc": { "totalComments": -1 }
        };
        let reports_filter = doc! { "commentID": comment_id };

        let (pulled, reports) = if self.transactions {
            let mut session = self.client.start_session().await?;
            session.start_transaction().await?;
            let pulled = self
                .posts()
                .update_one(post_filter, post_update)
                .session(&mut session)
                .await?;
            let reports = self
                .reports()
                .delete_many(reports_filter)
                .session(&mut session)
                .await?;
            session.commit_transaction().await?;
            (pulled, reports)
        } else {
            let pulled = self.posts().update_one(post_filter, post_update).await?;
            let reports = self.reports().delete_many(reports_filter).await?;
            (pulled, reports)
        };

        Ok(Some(CommentRemoval {
            post_id,
            comment_removed: pulled.modified_count > 0,
            reports_deleted: reports.deleted_count,
        }))
    }

    #[instrument(skip_all)]
    async fn insert_report(&self, mut report: Report) -> StoreResult<InsertOutcome> {
        let id = *report.id.get_or_insert_with(DocumentId::new);
        self.reports().insert_one(&report).await?;
        Ok(InsertOutcome { inserted_id: id })
    }

    async fn list_reports(&self) -> StoreResult<Vec<Report>> {
        let cursor = self.reports().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn delete_reports_for_comment(&self, comment_id: DocumentId) -> StoreResult<DeleteOutcome> {
        let result = self
            .reports()
            .delete_many(doc! { "commentID": comment_id })
            .await?;
        Ok(delete_outcome(result))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let cursor = self.users().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "userEmail": email }).await?)
    }

    #[instrument(skip_all)]
    async fn insert_user(&self, mut user: User) -> StoreResult<InsertOutcome> {
        let id = *user.id.get_or_insert_with(DocumentId::new);
        self.users().insert_one(&user).await?;
        Ok(InsertOutcome { inserted_id: id })
    }

    #[instrument(skip(self))]
    async fn promote_to_admin(&self, user_id: DocumentId) -> StoreResult<UpdateOutcome> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "userBadge": ADMIN, "userRole": ADMIN } },
            )
            .await?;
        Ok(update_outcome(result))
    }

    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>> {
        let cursor = self.announcements().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip_all)]
    async fn upsert_announcement(&self, text: AnnouncementText) -> StoreResult<UpdateOutcome> {
        // Empty filter: the collection holds at most one document.
        let result = self
            .announcements()
            .update_one(doc! {}, doc! { "$set": { "announcement": text.as_str() } })
            .upsert(true)
            .await?;
        Ok(update_outcome(result))
    }
}
