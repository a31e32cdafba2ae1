use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use forumhub_core::{DomainError, NewReport, Report};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/report", post(create_report))
        .route("/usersReports", get(list_reports))
}

/// POST /report
///
/// Snapshots the owning post's title and author onto the report before inserting it.
pub async fn create_report(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<NewReport>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let comment_id = match errors::parse_id(&body.comment_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let post = match services.store().find_post_by_comment(comment_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("comment")),
        Err(e) => return errors::store_error_to_response(e),
    };
    let report = Report::snapshot(body, comment_id, &post, Utc::now());

    match services.store().insert_report(report).await {
        Ok(outcome) => (StatusCode::CREATED, Json(dto::insert_ack(outcome))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /usersReports
pub async fn list_reports(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_reports().await {
        Ok(reports) => {
            let items = reports.iter().map(dto::report_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
