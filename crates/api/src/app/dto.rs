use bson::{Bson, Document};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use forumhub_core::{Announcement, Comment, DocumentId, Post, PostSummary, Report, User};
use forumhub_infra::store::{CommentRemoval, DeleteOutcome, InsertOutcome, UpdateOutcome};

// -------------------------
// Request DTOs
// -------------------------
//
// Post, comment, report and user bodies decode straight into the core
// `New*` types; only the query strings and the announcement body live here.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub post_title: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MyPostsQuery {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementRequest {
    pub announcement: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

fn id_to_json(id: Option<DocumentId>) -> Value {
    id.map(|v| Value::String(v.to_hex())).unwrap_or(Value::Null)
}

/// Overlay the typed fields on the document's untyped ones; typed fields win.
fn with_extra(extra: &Document, typed: Value) -> Value {
    let mut merged = match Bson::Document(extra.clone()).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Value::Object(typed) = typed {
        merged.extend(typed);
    }
    Value::Object(merged)
}

pub fn comment_to_json(c: &Comment) -> Value {
    json!({
        "commentID": c.id.to_hex(),
        "commenterName": c.commenter_name,
        "commenterEmail": c.commenter_email,
        "commenterProfile": c.commenter_profile,
        "comment": c.comment,
        "commentedAt": c.commented_at.map(|t| t.to_rfc3339()),
    })
}

pub fn post_to_json(p: &Post) -> Value {
    let typed = json!({
        "_id": id_to_json(p.id),
        "authorEmail": p.author_email,
        "authorName": p.author_name,
        "authorProfile": p.author_profile,
        "postTitle": p.post_title,
        "postDescription": p.post_description,
        "tag": p.tag,
        "totalUpvote": p.total_upvote,
        "totalDownvote": p.total_downvote,
        "totalComments": p.total_comments,
        "comments": p.comments.iter().map(comment_to_json).collect::<Vec<_>>(),
        "createdAt": p.created_at.map(|t| t.to_rfc3339()),
    });
    with_extra(&p.extra, typed)
}

pub fn posts_to_json(posts: &[Post]) -> Value {
    Value::Array(posts.iter().map(post_to_json).collect())
}

pub fn summary_to_json(s: &PostSummary) -> Value {
    let mut summary = json!({
        "_id": id_to_json(s.id),
        "authorName": s.author_name,
        "postTitle": s.post_title,
        "totalUpvote": s.total_upvote,
        "totalComments": s.total_comments,
        "tag": s.tag,
    });
    if let Some(post_id) = &s.post_id {
        summary["postID"] = post_id.clone().into_relaxed_extjson();
    }
    summary
}

pub fn report_to_json(r: &Report) -> Value {
    json!({
        "_id": id_to_json(r.id),
        "commentID": r.comment_id.to_hex(),
        "comment": r.comment,
        "feedback": r.feedback,
        "reporterEmail": r.reporter_email,
        "postTitle": r.post_title,
        "authorName": r.author_name,
        "authorEmail": r.author_email,
        "authorProfile": r.author_profile,
        "reportedAt": r.reported_at.map(|t| t.to_rfc3339()),
    })
}

pub fn user_to_json(u: &User) -> Value {
    let typed = json!({
        "_id": id_to_json(u.id),
        "userName": u.user_name,
        "userEmail": u.user_email,
        "userImage": u.user_image,
        "userBadge": u.user_badge,
        "userRole": u.user_role,
    });
    with_extra(&u.extra, typed)
}

pub fn announcement_to_json(a: &Announcement) -> Value {
    json!({
        "_id": id_to_json(a.id),
        "announcement": a.announcement,
    })
}

// Acknowledgements mirror the document store's result shapes.

pub fn insert_ack(outcome: InsertOutcome) -> Value {
    json!({
        "acknowledged": true,
        "insertedId": outcome.inserted_id.to_hex(),
    })
}

pub fn update_ack(outcome: UpdateOutcome) -> Value {
    json!({
        "acknowledged": true,
        "matchedCount": outcome.matched_count,
        "modifiedCount": outcome.modified_count,
        "upsertedCount": u64::from(outcome.upserted_id.is_some()),
        "upsertedId": id_to_json(outcome.upserted_id),
    })
}

pub fn delete_ack(outcome: DeleteOutcome) -> Value {
    json!({
        "acknowledged": true,
        "deletedCount": outcome.deleted_count,
    })
}

pub fn comment_removal_to_json(removal: CommentRemoval) -> Value {
    json!({
        "success": true,
        "postId": removal.post_id.to_hex(),
        "commentRemoved": removal.comment_removed,
        "deletedReports": removal.reports_deleted,
    })
}
