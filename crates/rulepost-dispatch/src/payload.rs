//! HAL+JSON content document posted by the dispatcher.

use serde::{Deserialize, Serialize};

/// Title given to every content item created by the action.
pub const DEFAULT_TITLE: &str = "API Created Content: Ticket";

/// Bundle (content type) the created item belongs to.
pub const DEFAULT_BUNDLE: &str = "article";

/// A single `{"value": ...}` field item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: String,
}

/// A single `{"target_id": ...}` entity reference item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetId {
    pub target_id: String,
}

/// A HAL link object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub href: String,
}

/// The `_links` section of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Link to the REST type resource of the bundle.
    #[serde(rename = "type")]
    pub kind: LinkRef,
}

/// Content item document sent as the request body.
///
/// ```json
/// {
///   "title": [{"value": "API Created Content: Ticket"}],
///   "type": [{"target_id": "article"}],
///   "field_user_id": [{"value": "42"}],
///   "_links": {"type": {"href": "https://example.com/rest/type/node/article"}}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadDocument {
    pub title: Vec<FieldValue>,
    #[serde(rename = "type")]
    pub bundle: Vec<TargetId>,
    /// Custom field on the bundle; omitted entirely when no user id is set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_user_id: Vec<FieldValue>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl PayloadDocument {
    /// Builds the document for the given link href and optional user id.
    pub fn new(link_href: impl Into<String>, user_id: Option<&str>) -> Self {
        Self {
            title: vec![FieldValue {
                value: DEFAULT_TITLE.to_owned(),
            }],
            bundle: vec![TargetId {
                target_id: DEFAULT_BUNDLE.to_owned(),
            }],
            field_user_id: user_id
                .map(|value| FieldValue {
                    value: value.to_owned(),
                })
                .into_iter()
                .collect(),
            links: Links {
                kind: LinkRef {
                    href: link_href.into(),
                },
            },
        }
    }

    /// Returns the href the document's type link points at.
    pub fn link_href(&self) -> &str {
        &self.links.kind.href
    }

    /// Returns the embedded user id, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.field_user_id.first().map(|item| item.value.as_str())
    }

    /// Serializes the document to JSON bytes.
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
