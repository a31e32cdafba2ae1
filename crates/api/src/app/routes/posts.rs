use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use forumhub_core::{categories_with_all, NewPost, Post, PostFilter, VoteUpdate, TOP_POSTS_LIMIT};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/search", get(search_posts))
        .route("/categories", get(list_categories))
        .route("/top-posts", get(top_posts))
        .route("/myposts", get(my_posts))
        .route("/newpost", post(create_post))
        .route("/postdetails/:id", get(get_post))
        .route("/postdetails/:id/vote", patch(vote))
        .route("/post/delete/:id", delete(delete_post))
}

/// GET /search?postTitle=&tag=
pub async fn search_posts(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::SearchQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };
    let filter = PostFilter::new(q.post_title, q.tag);

    match services.store().search_posts(&filter).await {
        Ok(posts) => (StatusCode::OK, Json(dto::posts_to_json(&posts))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /categories
pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().distinct_tags().await {
        Ok(tags) => (StatusCode::OK, Json(categories_with_all(tags))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /top-posts
pub async fn top_posts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().top_posts(TOP_POSTS_LIMIT).await {
        Ok(posts) => {
            let items = posts.iter().map(dto::summary_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /myposts?email=
pub async fn my_posts(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::MyPostsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };
    let Some(email) = q.email.filter(|e| !e.trim().is_empty()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_query",
            "email query parameter is required",
        );
    };

    match services.store().posts_by_author(&email).await {
        Ok(posts) => (StatusCode::OK, Json(dto::posts_to_json(&posts))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /newpost
pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let post = match Post::from_new(body, Utc::now()) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().insert_post(post).await {
        Ok(outcome) => {
            tracing::info!(post_id = %outcome.inserted_id, "post created");
            (StatusCode::CREATED, Json(dto::insert_ack(outcome))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /postdetails/:id: the post, or `null` when absent.
pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().get_post(id).await {
        Ok(Some(post)) => (StatusCode::OK, Json(dto::post_to_json(&post))).into_response(),
        Ok(None) => (StatusCode::OK, Json(Value::Null)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PATCH /postdetails/:id/vote
///
/// Only the counters present in the body are written; there is no version check,
/// so clients send both counts together.
pub async fn vote(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<VoteUpdate>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(vote) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    if let Err(e) = vote.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().apply_vote(id, vote).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::update_ack(outcome))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /post/delete/:id. Deleting an absent post is a zero-count success.
pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().delete_post(id).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::delete_ack(outcome))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
