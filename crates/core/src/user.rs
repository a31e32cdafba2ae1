//! Forum user records.

use bson::Document;
use serde::{Deserialize, Serialize};

use crate::extra::without_keys;
use crate::id::DocumentId;

/// Badge/role value assigned by the make-admin operation.
pub const ADMIN: &str = "Admin";

/// Keys a self-registration may not set. The role is granted only by make-admin.
const SERVER_OWNED_USER_KEYS: &[&str] = &["_id", "userRole"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub user_name: String,
    pub user_email: String,
    pub user_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

impl User {
    pub fn promote_to_admin(&mut self) {
        self.user_badge = Some(ADMIN.to_string());
        self.user_role = Some(ADMIN.to_string());
    }
}

/// Request payload for registering a user record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUser {
    pub user_name: String,
    pub user_email: String,
    pub user_image: String,
    pub user_badge: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

impl From<NewUser> for User {
    /// Registration never grants the admin role or badge.
    fn from(new: NewUser) -> Self {
        Self {
            id: None,
            user_name: new.user_name,
            user_email: new.user_email,
            user_image: new.user_image,
            user_badge: new.user_badge.filter(|badge| badge != ADMIN),
            user_role: None,
            extra: without_keys(new.extra, SERVER_OWNED_USER_KEYS),
        }
    }
}
