//! Site-wide announcement (singleton document).

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::DocumentId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Announcement {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub announcement: String,
}

/// Validated announcement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementText(String);

impl AnnouncementText {
    pub fn parse(raw: Option<String>) -> DomainResult<Self> {
        match raw {
            Some(text) if !text.trim().is_empty() => Ok(Self(text)),
            _ => Err(DomainError::validation("Announcement text is required")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_required() {
        assert!(AnnouncementText::parse(None).is_err());
        assert!(AnnouncementText::parse(Some(" \n".into())).is_err());
        assert_eq!(
            AnnouncementText::parse(Some("Maintenance tonight".into())).unwrap().as_str(),
            "Maintenance tonight"
        );
    }
}
