use std::sync::RwLock;

use async_trait::async_trait;

use forumhub_core::{
    Announcement, AnnouncementText, Comment, DocumentId, Post, PostFilter, PostSummary, Report,
    User, VoteUpdate,
};

use super::{
    CommentRemoval, DeleteOutcome, ForumStore, InsertOutcome, StoreError, StoreResult,
    UpdateOutcome,
};

/// In-memory document store.
///
/// Intended for tests/dev. Collections keep insertion order, which stands in for
/// the natural order of a document collection.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    posts: RwLock<Vec<Post>>,
    reports: RwLock<Vec<Report>>,
    users: RwLock<Vec<User>>,
    announcement: RwLock<Option<Announcement>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// A poisoned lock only means another request panicked mid-write; the data is still usable.
fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

fn delete_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> DeleteOutcome {
    let before = items.len();
    items.retain(|item| !pred(item));
    DeleteOutcome {
        deleted_count: (before - items.len()) as u64,
    }
}

#[async_trait]
impl ForumStore for InMemoryStore {
    async fn search_posts(&self, filter: &PostFilter) -> StoreResult<Vec<Post>> {
        Ok(read(&self.posts)
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn distinct_tags(&self) -> StoreResult<Vec<String>> {
        let mut tags: Vec<String> = read(&self.posts).iter().map(|p| p.tag.clone()).collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn top_posts(&self, limit: usize) -> StoreResult<Vec<PostSummary>> {
        let mut posts: Vec<PostSummary> = read(&self.posts).iter().map(PostSummary::from).collect();
        // Stable sort keeps collection order among equal vote counts.
        posts.sort_by(|a, b| b.total_upvote.cmp(&a.total_upvote));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn get_post(&self, id: DocumentId) -> StoreResult<Option<Post>> {
        Ok(read(&self.posts).iter().find(|p| p.id == Some(id)).cloned())
    }

    async fn posts_by_author(&self, email: &str) -> StoreResult<Vec<Post>> {
        Ok(read(&self.posts)
            .iter()
            .filter(|p| p.author_email == email)
            .cloned()
            .collect())
    }

    async fn insert_post(&self, mut post: Post) -> StoreResult<InsertOutcome> {
        let id = *post.id.get_or_insert_with(DocumentId::new);
        write(&self.posts).push(post);
        Ok(InsertOutcome { inserted_id: id })
    }

    async fn apply_vote(&self, id: DocumentId, vote: VoteUpdate) -> StoreResult<UpdateOutcome> {
        let mut posts = write(&self.posts);
        let Some(post) = posts.iter_mut().find(|p| p.id == Some(id)) else {
            return Ok(UpdateOutcome::default());
        };
        let before = (post.total_upvote, post.total_downvote);
        vote.apply(post);
        let modified = before != (post.total_upvote, post.total_downvote);
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: modified as u64,
            upserted_id: None,
        })
    }

    async fn delete_post(&self, id: DocumentId) -> StoreResult<DeleteOutcome> {
        Ok(delete_where(&mut write(&self.posts), |p| p.id == Some(id)))
    }

    async fn add_comment(&self, post_id: DocumentId, comment: Comment) -> StoreResult<UpdateOutcome> {
        let mut posts = write(&self.posts);
        let post = posts
            .iter_mut()
            .find(|p| p.id == Some(post_id))
            .ok_or(StoreError::NotFound("post"))?;
        post.push_comment(comment);
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: 1,
            upserted_id: None,
        })
    }

    async fn find_post_by_comment(&self, comment_id: DocumentId) -> StoreResult<Option<Post>> {
        Ok(read(&self.posts)
            .iter()
            .find(|p| p.contains_comment(comment_id))
            .cloned())
    }

    async fn remove_comment(&self, comment_id: DocumentId) -> StoreResult<Option<CommentRemoval>> {
        // Both locks are held for the whole cascade, so readers never observe a half-applied removal.
        let mut posts = write(&self.posts);
        let mut reports = write(&self.reports);

        let Some(post) = posts.iter_mut().find(|p| p.contains_comment(comment_id)) else {
            return Ok(None);
        };
        let post_id = post.id.ok_or(StoreError::NotFound("post id"))?;
        let comment_removed = post.remove_comment(comment_id);
        let deleted = delete_where(&mut reports, |r| r.comment_id == comment_id);

        Ok(Some(CommentRemoval {
            post_id,
            comment_removed,
            reports_deleted: deleted.deleted_count,
        }))
    }

    async fn insert_report(&self, mut report: Report) -> StoreResult<InsertOutcome> {
        let id = *report.id.get_or_insert_with(DocumentId::new);
        write(&self.reports).push(report);
        Ok(InsertOutcome { inserted_id: id })
    }

    async fn list_reports(&self) -> StoreResult<Vec<Report>> {
        Ok(read(&self.reports).clone())
    }

    async fn delete_reports_for_comment(&self, comment_id: DocumentId) -> StoreResult<DeleteOutcome> {
        Ok(delete_where(&mut write(&self.reports), |r| r.comment_id == comment_id))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(read(&self.users).clone())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(read(&self.users).iter().find(|u| u.user_email == email).cloned())
    }

    async fn insert_user(&self, mut user: User) -> StoreResult<InsertOutcome> {
        let id = *user.id.get_or_insert_with(DocumentId::new);
        write(&self.users).push(user);
        Ok(InsertOutcome { inserted_id: id })
    }

    async fn promote_to_admin(&self, user_id: DocumentId) -> StoreResult<UpdateOutcome> {
        let mut users = write(&self.users);
        let Some(user) = users.iter_mut().find(|u| u.id == Some(user_id)) else {
            return Ok(UpdateOutcome::default());
        };
        let before = user.clone();
        user.promote_to_admin();
        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: (before != *user) as u64,
            upserted_id: None,
        })
    }

    async fn list_announcements(&self) -> StoreResult<Vec<Announcement>> {
        Ok(read(&self.announcement).iter().cloned().collect())
    }

    async fn upsert_announcement(&self, text: AnnouncementText) -> StoreResult<UpdateOutcome> {
        let mut slot = write(&self.announcement);
        match slot.as_mut() {
            Some(existing) => {
                let modified = existing.announcement != text.as_str();
                existing.announcement = text.into_inner();
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: modified as u64,
                    upserted_id: None,
                })
            }
            None => {
                let id = DocumentId::new();
                *slot = Some(Announcement {
                    id: Some(id),
                    announcement: text.into_inner(),
                });
                Ok(UpdateOutcome {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: Some(id),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forumhub_core::{NewComment, NewReport};

    fn post(title: &str, tag: &str, upvotes: i64) -> Post {
        Post {
            post_title: title.to_string(),
            tag: tag.to_string(),
            total_upvote: upvotes,
            author_email: "author@example.com".to_string(),
            ..Post::default()
        }
    }

    fn comment(text: &str) -> Comment {
        Comment::from_new(
            NewComment {
                comment: text.to_string(),
                ..NewComment::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn search_by_title_and_tag() {
        let store = InMemoryStore::new();
        store.insert_post(post("Hello World", "Tech", 0)).await.unwrap();
        store.insert_post(post("Painting tips", "Art", 0)).await.unwrap();

        let hits = store
            .search_posts(&PostFilter::new(Some("hello".into()), None))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post_title, "Hello World");

        let hits = store
            .search_posts(&PostFilter::new(None, Some("Art".into())))
            .await
            .unwrap();
        assert!(hits.iter().all(|p| p.tag == "Art"));
    }

    #[tokio::test]
    async fn distinct_tags_lists_each_tag_once() {
        let store = InMemoryStore::new();
        for tag in ["Tech", "Art", "Tech", "Tech"] {
            store.insert_post(post("x", tag, 0)).await.unwrap();
        }
        assert_eq!(store.distinct_tags().await.unwrap(), vec!["Art", "Tech"]);
    }

    #[tokio::test]
    async fn top_posts_are_capped_and_sorted() {
        let store = InMemoryStore::new();
        for votes in [3, 9, 1, 7, 7, 0, 12] {
            store.insert_post(post("x", "t", votes)).await.unwrap();
        }
        let top = store.top_posts(5).await.unwrap();
        let votes: Vec<i64> = top.iter().map(|p| p.total_upvote).collect();
        assert_eq!(votes, vec![12, 9, 7, 7, 3]);
    }

    #[tokio::test]
    async fn add_comment_keeps_counter_equal_to_length() {
        let store = InMemoryStore::new();
        let id = store.insert_post(post("x", "t", 0)).await.unwrap().inserted_id;

        store.add_comment(id, comment("one")).await.unwrap();
        store.add_comment(id, comment("two")).await.unwrap();

        let p = store.get_post(id).await.unwrap().unwrap();
        assert_eq!(p.comments.len(), 2);
        assert_eq!(p.total_comments, 2);
    }

    #[tokio::test]
    async fn add_comment_to_missing_post_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.add_comment(DocumentId::new(), comment("lost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound("post")));
    }

    #[tokio::test]
    async fn remove_comment_cascades_to_reports() {
        let store = InMemoryStore::new();
        let post_id = store.insert_post(post("x", "t", 0)).await.unwrap().inserted_id;
        let c = comment("bad");
        let comment_id = c.id;
        store.add_comment(post_id, c).await.unwrap();
        store.add_comment(post_id, comment("fine")).await.unwrap();

        let owner = store.find_post_by_comment(comment_id).await.unwrap().unwrap();
        let report = Report::snapshot(
            NewReport {
                comment_id: comment_id.to_hex(),
                feedback: "spam".into(),
                reporter_email: "mod@example.com".into(),
                ..NewReport::default()
            },
            comment_id,
            &owner,
            Utc::now(),
        );
        store.insert_report(report).await.unwrap();

        let removal = store.remove_comment(comment_id).await.unwrap().unwrap();
        assert_eq!(removal.post_id, post_id);
        assert!(removal.comment_removed);
        assert_eq!(removal.reports_deleted, 1);

        let p = store.get_post(post_id).await.unwrap().unwrap();
        assert!(!p.contains_comment(comment_id));
        assert_eq!(p.total_comments, 1);
        assert!(store.list_reports().await.unwrap().is_empty());

        assert!(store.remove_comment(comment_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_post_reports_zero() {
        let store = InMemoryStore::new();
        let outcome = store.delete_post(DocumentId::new()).await.unwrap();
        assert_eq!(outcome.deleted_count, 0);
    }

    #[tokio::test]
    async fn announcement_upsert_keeps_a_single_document() {
        let store = InMemoryStore::new();
        let first = store
            .upsert_announcement(AnnouncementText::parse(Some("v1".into())).unwrap())
            .await
            .unwrap();
        assert!(first.upserted_id.is_some());

        let second = store
            .upsert_announcement(AnnouncementText::parse(Some("v2".into())).unwrap())
            .await
            .unwrap();
        assert_eq!(second.matched_count, 1);
        assert!(second.upserted_id.is_none());

        let all = store.list_announcements().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].announcement, "v2");
        assert_eq!(all[0].id, first.upserted_id);
    }

    #[tokio::test]
    async fn promote_to_admin_updates_matching_user_only() {
        let store = InMemoryStore::new();
        let id = store
            .insert_user(User {
                user_email: "ada@example.com".into(),
                ..User::default()
            })
            .await
            .unwrap()
            .inserted_id;

        let missing = store.promote_to_admin(DocumentId::new()).await.unwrap();
        assert_eq!(missing.matched_count, 0);

        let outcome = store.promote_to_admin(id).await.unwrap();
        assert_eq!((outcome.matched_count, outcome.modified_count), (1, 1));

        let user = store.find_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(user.user_role.as_deref(), Some(forumhub_core::ADMIN));
    }
}
