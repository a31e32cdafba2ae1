//! Client-supplied document fields outside the typed schema.
//!
//! Posts and users are stored as the client sent them, so fields this crate does
//! not model (`postID`, `upVotedBy`, ...) ride along in a flattened `Document`.

use bson::Document;

/// Remove keys owned by typed fields (or never accepted from clients).
pub(crate) fn without_keys(mut extra: Document, keys: &[&str]) -> Document {
    for key in keys {
        extra.remove(*key);
    }
    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn strips_only_listed_keys() {
        let extra = doc! { "_id": 1, "postID": "p-1", "comments": [] };
        assert_eq!(without_keys(extra, &["_id", "comments"]), doc! { "postID": "p-1" });
    }
}
