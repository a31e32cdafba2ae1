//! Forum posts and their embedded comments.

use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::extra::without_keys;
use crate::id::DocumentId;

/// Synthetic first entry of the categories list.
pub const ALL_CATEGORIES: &str = "All";

/// Default number of posts returned by the featured listing.
pub const TOP_POSTS_LIMIT: usize = 5;

/// Keys a creation request may not set; the store and the comment routes own them.
const SERVER_OWNED_POST_KEYS: &[&str] = &["_id", "comments", "totalComments", "createdAt"];

/// A forum post as stored in the posts collection.
///
/// `total_comments` is kept equal to `comments.len()` by every mutation in this
/// crate and by the store updates that mirror them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub author_email: String,
    pub author_name: String,
    pub author_profile: String,
    pub post_title: String,
    pub post_description: String,
    pub tag: String,
    pub total_upvote: i64,
    pub total_downvote: i64,
    pub total_comments: i64,
    pub comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Any other fields the client stored on the post.
    #[serde(flatten)]
    pub extra: Document,
}

impl Post {
    /// Build a storable post from a creation request.
    pub fn from_new(new: NewPost, now: DateTime<Utc>) -> DomainResult<Self> {
        new.validate()?;
        Ok(Self {
            id: None,
            author_email: new.author_email,
            author_name: new.author_name,
            author_profile: new.author_profile,
            post_title: new.post_title,
            post_description: new.post_description,
            tag: new.tag,
            total_upvote: new.total_upvote,
            total_downvote: new.total_downvote,
            total_comments: 0,
            comments: Vec::new(),
            created_at: Some(now),
            extra: without_keys(new.extra, SERVER_OWNED_POST_KEYS),
        })
    }

    pub fn contains_comment(&self, comment_id: DocumentId) -> bool {
        self.comments.iter().any(|c| c.id == comment_id)
    }

    /// Append a comment and recompute the counter from the array length.
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.total_comments = self.comments.len() as i64;
    }

    /// Remove a comment by id and decrement the counter by one.
    ///
    /// Returns `false` (and leaves the post untouched) if the comment is absent.
    pub fn remove_comment(&mut self, comment_id: DocumentId) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != comment_id);
        if self.comments.len() == before {
            return false;
        }
        self.total_comments -= 1;
        true
    }
}

/// Request payload for creating a post.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPost {
    pub author_email: String,
    pub author_name: String,
    pub author_profile: String,
    pub post_title: String,
    pub post_description: String,
    pub tag: String,
    pub total_upvote: i64,
    pub total_downvote: i64,
    #[serde(flatten)]
    pub extra: Document,
}

impl NewPost {
    pub fn validate(&self) -> DomainResult<()> {
        if self.post_title.trim().is_empty() {
            return Err(DomainError::validation("postTitle must not be empty"));
        }
        Ok(())
    }
}

/// A comment embedded in a post's `comments` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "commentID")]
    pub id: DocumentId,
    #[serde(default)]
    pub commenter_name: String,
    #[serde(default)]
    pub commenter_email: String,
    #[serde(default)]
    pub commenter_profile: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commented_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Assign a fresh identifier and timestamp to a submitted comment.
    pub fn from_new(new: NewComment, now: DateTime<Utc>) -> DomainResult<Self> {
        if new.comment.trim().is_empty() {
            return Err(DomainError::validation("comment must not be empty"));
        }
        Ok(Self {
            id: DocumentId::new(),
            commenter_name: new.commenter_name,
            commenter_email: new.commenter_email,
            commenter_profile: new.commenter_profile,
            comment: new.comment,
            commented_at: Some(now),
        })
    }
}

/// Request payload for adding a comment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewComment {
    pub commenter_name: String,
    pub commenter_email: String,
    pub commenter_profile: String,
    pub comment: String,
}

/// Projection of a post used by the featured listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostSummary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub author_name: String,
    pub post_title: String,
    pub total_upvote: i64,
    pub total_comments: i64,
    pub tag: String,
    /// Client-assigned post key, when the post carries one.
    #[serde(rename = "postID", skip_serializing_if = "Option::is_none")]
    pub post_id: Option<Bson>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            post_id: post.extra.get("postID").cloned(),
            author_name: post.author_name.clone(),
            post_title: post.post_title.clone(),
            total_upvote: post.total_upvote,
            total_comments: post.total_comments,
            tag: post.tag.clone(),
        }
    }
}

/// Search criteria for posts. Both criteria are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    title_contains: Option<String>,
    tag: Option<String>,
}

impl PostFilter {
    /// Empty parameters are treated as absent. Whitespace is a real criterion.
    pub fn new(title_contains: Option<String>, tag: Option<String>) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());
        Self {
            title_contains: non_empty(title_contains),
            tag: non_empty(tag),
        }
    }

    pub fn title_contains(&self) -> Option<&str> {
        self.title_contains.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Case-insensitive substring match on title, exact match on tag.
    pub fn matches(&self, post: &Post) -> bool {
        let title_ok = self.title_contains.as_ref().is_none_or(|needle| {
            post.post_title
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let tag_ok = self.tag.as_ref().is_none_or(|t| post.tag == *t);
        title_ok && tag_ok
    }
}

/// Partial update of a post's vote counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_upvote: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_downvote: Option<i64>,
}

impl VoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.total_upvote.is_none() && self.total_downvote.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation(
                "body must contain totalUpvote and/or totalDownvote",
            ));
        }
        Ok(())
    }

    /// Set only the counters present in the update.
    pub fn apply(&self, post: &mut Post) {
        if let Some(up) = self.total_upvote {
            post.total_upvote = up;
        }
        if let Some(down) = self.total_downvote {
            post.total_downvote = down;
        }
    }
}

/// Build the categories list: `"All"` followed by each distinct tag once, sorted.
pub fn categories_with_all<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let distinct: std::collections::BTreeSet<String> = tags
        .into_iter()
        .filter(|t| !t.is_empty() && t != ALL_CATEGORIES)
        .collect();

    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(distinct)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, tag: &str, upvotes: i64) -> Post {
        Post {
            id: Some(DocumentId::new()),
            post_title: title.to_string(),
            tag: tag.to_string(),
            total_upvote: upvotes,
            ..Post::default()
        }
    }

    fn new_comment(text: &str) -> NewComment {
        NewComment {
            commenter_name: "Ada".to_string(),
            commenter_email: "ada@example.com".to_string(),
            comment: text.to_string(),
            ..NewComment::default()
        }
    }

    #[test]
    fn filter_matches_title_case_insensitively() {
        let p = post("Hello World", "Tech", 0);
        assert!(PostFilter::new(Some("hello".into()), None).matches(&p));
        assert!(PostFilter::new(Some("LO WOR".into()), None).matches(&p));
        assert!(!PostFilter::new(Some("goodbye".into()), None).matches(&p));
    }

    #[test]
    fn filter_combines_title_and_tag_with_and() {
        let p = post("Hello World", "Tech", 0);
        assert!(PostFilter::new(Some("world".into()), Some("Tech".into())).matches(&p));
        assert!(!PostFilter::new(Some("world".into()), Some("Art".into())).matches(&p));
        assert!(!PostFilter::new(None, Some("tech".into())).matches(&p));
    }

    #[test]
    fn empty_filter_parameters_match_everything() {
        let f = PostFilter::new(Some(String::new()), Some(String::new()));
        assert_eq!(f, PostFilter::default());
        assert!(f.matches(&post("anything", "Any", 0)));
    }

    #[test]
    fn whitespace_filter_parameters_are_real_criteria() {
        let p = post("Hello World", "Tech", 0);
        assert!(!PostFilter::new(None, Some(" ".into())).matches(&p));
        assert!(!PostFilter::new(Some("  ".into()), None).matches(&p));
        assert!(PostFilter::new(Some(" ".into()), None).matches(&p));
    }

    #[test]
    fn push_comment_recomputes_counter_from_length() {
        let mut p = post("t", "x", 0);
        p.total_comments = 42;
        p.push_comment(Comment::from_new(new_comment("first"), Utc::now()).unwrap());
        assert_eq!(p.total_comments, 1);
        p.push_comment(Comment::from_new(new_comment("second"), Utc::now()).unwrap());
        assert_eq!(p.total_comments, p.comments.len() as i64);
    }

    #[test]
    fn remove_comment_decrements_by_exactly_one() {
        let mut p = post("t", "x", 0);
        let c1 = Comment::from_new(new_comment("a"), Utc::now()).unwrap();
        let c2 = Comment::from_new(new_comment("b"), Utc::now()).unwrap();
        let target = c1.id;
        p.push_comment(c1);
        p.push_comment(c2);

        assert!(p.remove_comment(target));
        assert!(!p.contains_comment(target));
        assert_eq!(p.total_comments, 1);

        assert!(!p.remove_comment(target));
        assert_eq!(p.total_comments, 1);
    }

    #[test]
    fn comment_requires_text() {
        let err = Comment::from_new(new_comment("   "), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_post_requires_title_and_starts_without_comments() {
        let err = Post::from_new(NewPost::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let p = Post::from_new(
            NewPost {
                post_title: "Hello".into(),
                tag: "Tech".into(),
                ..NewPost::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(p.total_comments, 0);
        assert!(p.comments.is_empty());
        assert!(p.id.is_none());
    }

    #[test]
    fn vote_update_sets_only_present_fields() {
        let mut p = post("t", "x", 3);
        p.total_downvote = 7;
        VoteUpdate { total_upvote: Some(4), total_downvote: None }.apply(&mut p);
        assert_eq!((p.total_upvote, p.total_downvote), (4, 7));

        assert!(VoteUpdate::default().validate().is_err());
    }

    #[test]
    fn categories_prefix_all_and_deduplicate() {
        let tags = vec!["Tech".to_string(), "Art".to_string(), "Tech".to_string()];
        assert_eq!(categories_with_all(tags), vec!["All", "Art", "Tech"]);
        assert_eq!(categories_with_all(Vec::<String>::new()), vec!["All"]);
    }

    #[test]
    fn new_post_keeps_client_fields_but_not_server_owned_ones() {
        let raw = serde_json::json!({
            "postTitle": "Hello",
            "postID": "p-1",
            "upVotedBy": ["a@b.c"],
            "comments": [{ "comment": "injected" }],
            "totalComments": 9,
        });
        let new: NewPost = serde_json::from_value(raw).unwrap();
        let p = Post::from_new(new, Utc::now()).unwrap();

        assert_eq!(p.extra.get_str("postID").unwrap(), "p-1");
        assert!(p.extra.get_array("upVotedBy").is_ok());
        assert!(!p.extra.contains_key("comments"));
        assert!(!p.extra.contains_key("totalComments"));
        assert!(p.comments.is_empty());
        assert_eq!(PostSummary::from(&p).post_id, Some(Bson::String("p-1".into())));
    }

    #[test]
    fn post_reads_documents_with_missing_fields() {
        let raw = serde_json::json!({ "postTitle": "Hello World", "tag": "Tech", "totalUpvote": 0 });
        let p: Post = serde_json::from_value(raw).unwrap();
        assert_eq!(p.post_title, "Hello World");
        assert_eq!(p.total_comments, 0);
        assert!(p.comments.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every tag appears exactly once after the "All" prefix.
            #[test]
            fn categories_contain_each_tag_once(tags in proptest::collection::vec("[A-Za-z]{1,8}", 0..30)) {
                let cats = categories_with_all(tags.clone());
                prop_assert_eq!(cats[0].as_str(), ALL_CATEGORIES);
                for t in tags.iter().filter(|t| t.as_str() != ALL_CATEGORIES) {
                    prop_assert_eq!(cats.iter().filter(|c| *c == t).count(), 1);
                }
            }

            /// Property: a title always matches any of its own substrings in any case.
            #[test]
            fn title_matches_own_substring(title in "[A-Za-z ]{1,40}", start in 0usize..40, len in 1usize..10) {
                let start = start.min(title.len() - 1);
                let end = (start + len).min(title.len());
                let needle = title[start..end].to_uppercase();
                prop_assume!(!needle.trim().is_empty());
                let p = post(&title, "x", 0);
                prop_assert!(PostFilter::new(Some(needle), None).matches(&p));
            }
        }
    }
}
