use axum::Router;

use crate::middleware::{self, AdminGuard};

pub mod admin;
pub mod announcements;
pub mod comments;
pub mod posts;
pub mod reports;
pub mod system;
pub mod users;

/// Router for all forum endpoints.
///
/// Moderation endpoints (`/admin/*`, `/add-announcement`) sit behind the admin
/// guard; everything else is public.
pub fn router(guard: AdminGuard) -> Router {
    let moderation = Router::new()
        .nest("/admin", admin::router())
        .merge(announcements::admin_router())
        .layer(axum::middleware::from_fn_with_state(
            guard,
            middleware::require_admin,
        ));

    Router::new()
        .merge(posts::router())
        .merge(comments::router())
        .merge(reports::router())
        .merge(users::router())
        .merge(announcements::router())
        .merge(moderation)
}
