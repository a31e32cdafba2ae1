use axum::http::StatusCode;

pub async fn root() -> &'static str {
    "complete initial server setup"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
