use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use forumhub_core::{Comment, NewComment};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/postdetails/:id/add-comment", post(add_comment))
}

/// POST /postdetails/:id/add-comment
///
/// Assigns a fresh `commentID`, appends the comment and recounts `totalComments`.
pub async fn add_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> axum::response::Response {
    let post_id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let comment = match Comment::from_new(body, Utc::now()) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let comment_id = comment.id;

    match services.store().add_comment(post_id, comment).await {
        Ok(outcome) => {
            let mut ack = dto::update_ack(outcome);
            ack["commentID"] = comment_id.to_hex().into();
            (StatusCode::OK, Json(ack)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
