//! Strongly-typed document identifier used across the domain.

use core::str::FromStr;

use bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a stored document (post, comment, report, user, announcement).
///
/// Every id that crosses the HTTP boundary is parsed into this type, so embedded
/// comment ids and report references always compare as the same binary value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// Create a new identifier (time-ordered ObjectId).
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// 24-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ObjectId> for DocumentId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl From<DocumentId> for ObjectId {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

impl From<DocumentId> for Bson {
    fn from(value: DocumentId) -> Self {
        Bson::ObjectId(value.0)
    }
}

impl FromStr for DocumentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let oid = ObjectId::parse_str(s.trim())
            .map_err(|e| DomainError::invalid_id(format!("DocumentId: {e}")))?;
        Ok(Self(oid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_renders_it_back() {
        let id: DocumentId = "65a1f0c2b3d4e5f601234567".parse().unwrap();
        assert_eq!(id.to_hex(), "65a1f0c2b3d4e5f601234567");
        assert_eq!(id.to_string(), "65a1f0c2b3d4e5f601234567");
    }

    #[test]
    fn rejects_malformed_ids_with_invalid_id_error() {
        for raw in ["", "abc", "not-an-object-id-at-all!", "65a1f0c2b3d4e5f60123456z"] {
            let err = raw.parse::<DocumentId>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidId(_)), "{raw:?} -> {err:?}");
        }
    }

    #[test]
    fn converts_into_bson_object_id() {
        let id = DocumentId::new();
        assert_eq!(Bson::from(id), Bson::ObjectId(ObjectId::from(id)));
    }
}
