use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Object type tag of activities the relay knows how to render.
pub const NODE_OBJECT_TYPE: &str = "node";

/// What an activity points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Node,
    Other(String),
}

impl From<&str> for ObjectKind {
    fn from(raw: &str) -> Self {
        match raw {
            NODE_OBJECT_TYPE => Self::Node,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Node type tag. Only comments are rendered; every other type is carried
/// through verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Comment,
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Comment => "comment",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for NodeKind {
    fn from(raw: &str) -> Self {
        match raw {
            "comment" => Self::Comment,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Replied,
    Commented,
    Other(String),
}

impl Verb {
    /// Human readable action, e.g. "left a comment on". Unknown verbs pass
    /// through unchanged.
    pub fn action(&self) -> &str {
        match self {
            Self::Replied => "replied to",
            Self::Commented => "left a comment on",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for Verb {
    fn from(raw: &str) -> Self {
        match raw {
            "replied" => Self::Replied,
            "commented" => Self::Commented,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Client URL of a node; the web app redirects to the node's real location.
pub fn node_url(node_id: i32) -> String {
    format!("/nodes/{}/redir", node_id)
}

/// Client-facing notification, serialized as the `data:` line of a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingPayload {
    #[serde(rename = "_id")]
    pub id: i32,
    /// Actor display name, empty when the actor is unknown.
    #[serde(rename = "username")]
    pub actor: String,
    #[serde(rename = "username_avatar")]
    pub avatar: String,
    pub action: String,
    pub object_type: String,
    pub object_name: String,
    pub object_url: String,
    pub context_object_type: String,
    pub context_object_name: String,
    pub context_object_url: String,
    pub date: DateTime<Utc>,
    pub is_read: bool,
    pub is_subscribed: bool,
    /// Only set when a subscription record exists.
    pub subscription: Option<i32>,
}
