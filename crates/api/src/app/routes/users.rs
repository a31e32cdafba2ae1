use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use forumhub_core::{NewUser, User};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/usersInfo", get(list_users).post(create_user))
        .route("/usersInfo/:email", get(get_user_by_email))
}

/// GET /usersInfo
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_users().await {
        Ok(users) => {
            let items = users.iter().map(dto::user_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /usersInfo/:email: the user, or `null` when absent.
pub async fn get_user_by_email(
    Extension(services): Extension<Arc<AppServices>>,
    Path(email): Path<String>,
) -> axum::response::Response {
    match services.store().find_user_by_email(&email).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => (StatusCode::OK, Json(Value::Null)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /usersInfo
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.store().insert_user(User::from(body)).await {
        Ok(outcome) => (StatusCode::CREATED, Json(dto::insert_ack(outcome))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
