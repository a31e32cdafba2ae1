use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use forumhub_core::AnnouncementText;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/announcement", get(list_announcements))
}

/// Routes that change the announcement (mounted behind the admin guard).
pub fn admin_router() -> Router {
    Router::new().route("/add-announcement", put(upsert_announcement))
}

/// GET /announcement
pub async fn list_announcements(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_announcements().await {
        Ok(items) => {
            let items = items.iter().map(dto::announcement_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /add-announcement
pub async fn upsert_announcement(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::AnnouncementRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let text = match AnnouncementText::parse(body.announcement) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().upsert_announcement(text).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::update_ack(outcome))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
