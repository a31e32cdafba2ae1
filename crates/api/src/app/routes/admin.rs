//! Moderation routes.
//!
//! Mounted under `/admin` behind the admin guard (see `crate::middleware`).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, put},
    Json, Router,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/delete-comment/:id", delete(delete_comment))
        .route("/reject-comment/:id", delete(reject_comment))
        .route("/make-admin/:id", put(make_admin))
}

/// DELETE /admin/delete-comment/:id
///
/// Removes the comment from its post (decrementing `totalComments`) and deletes
/// every report filed against it.
pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let comment_id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().remove_comment(comment_id).await {
        Ok(Some(removal)) => {
            tracing::info!(
                %comment_id,
                post_id = %removal.post_id,
                reports_deleted = removal.reports_deleted,
                "comment removed by moderator"
            );
            (StatusCode::OK, Json(dto::comment_removal_to_json(removal))).into_response()
        }
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "Post containing the comment not found",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /admin/reject-comment/:id
///
/// Dismisses the reports and keeps the comment.
pub async fn reject_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let comment_id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().delete_reports_for_comment(comment_id).await {
        Ok(outcome) if outcome.deleted_count == 0 => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "Report not found")
        }
        Ok(outcome) => (StatusCode::OK, Json(dto::delete_ack(outcome))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /admin/make-admin/:id
pub async fn make_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().promote_to_admin(user_id).await {
        Ok(outcome) => {
            tracing::info!(%user_id, matched = outcome.matched_count, "make-admin applied");
            (StatusCode::OK, Json(dto::update_ack(outcome))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
