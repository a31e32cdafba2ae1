//! Moderation reports filed against comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::DocumentId;
use crate::post::Post;

/// A report on a comment, carrying a snapshot of the post's author and title
/// as they were when the report was filed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(rename = "commentID")]
    pub comment_id: DocumentId,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub reporter_email: String,
    #[serde(default)]
    pub post_title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub author_profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
}

/// Request payload for filing a report.
///
/// `commentID` arrives as raw text and is parsed by the caller, so a malformed
/// id is reported as an id error rather than a body error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    #[serde(rename = "commentID", default)]
    pub comment_id: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub reporter_email: String,
}

impl Report {
    /// Denormalize the owning post's title and author fields onto the report.
    pub fn snapshot(
        new: NewReport,
        comment_id: DocumentId,
        post: &Post,
        now: DateTime<Utc>,
    ) -> Self {
        // Fall back to the stored comment text when the reporter did not echo it.
        let comment = if new.comment.trim().is_empty() {
            post.comments
                .iter()
                .find(|c| c.id == comment_id)
                .map(|c| c.comment.clone())
                .unwrap_or_default()
        } else {
            new.comment
        };

        Self {
            id: None,
            comment_id,
            comment,
            feedback: new.feedback,
            reporter_email: new.reporter_email,
            post_title: post.post_title.clone(),
            author_name: post.author_name.clone(),
            author_email: post.author_email.clone(),
            author_profile: post.author_profile.clone(),
            reported_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{Comment, NewComment};

    #[test]
    fn snapshot_copies_post_fields_at_report_time() {
        let mut post = Post {
            id: Some(DocumentId::new()),
            post_title: "Hello World".into(),
            author_name: "Grace".into(),
            author_email: "grace@example.com".into(),
            author_profile: "https://img/grace.png".into(),
            ..Post::default()
        };
        let comment = Comment::from_new(
            NewComment { comment: "rude remark".into(), ..NewComment::default() },
            Utc::now(),
        )
        .unwrap();
        let comment_id = comment.id;
        post.push_comment(comment);

        let report = Report::snapshot(
            NewReport {
                comment_id: comment_id.to_hex(),
                feedback: "offensive".into(),
                reporter_email: "mod@example.com".into(),
                ..NewReport::default()
            },
            comment_id,
            &post,
            Utc::now(),
        );

        assert_eq!(report.comment_id, comment_id);
        assert_eq!(report.comment, "rude remark");
        assert_eq!(report.post_title, "Hello World");
        assert_eq!(report.author_email, "grace@example.com");

        // Later edits to the post do not reach the stored snapshot.
        post.post_title = "Edited".into();
        assert_eq!(report.post_title, "Hello World");
    }
}
