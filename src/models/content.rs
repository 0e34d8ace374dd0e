use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Trash,
}

impl FromStr for ContentStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" | "Publish" => Ok(ContentStatus::Publish),
            "draft" | "Draft" => Ok(ContentStatus::Draft),
            "pending" | "Pending" => Ok(ContentStatus::Pending),
            "private" | "Private" => Ok(ContentStatus::Private),
            "trash" | "Trash" => Ok(ContentStatus::Trash),
            _ => Err(format!("Unknown ContentStatus: {}", s)),
        }
    }
}

/// An item owned by the host site. Read-only from this service's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub title: String,
    pub status: ContentStatus,
    pub viewable: bool,
    pub author_id: Uuid,
}

impl ContentItem {
    pub fn is_public(&self) -> bool {
        self.status == ContentStatus::Publish && self.viewable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ContentStatus, viewable: bool) -> ContentItem {
        ContentItem {
            id: 1,
            title: "Article".into(),
            status,
            viewable,
            author_id: Uuid::nil(),
        }
    }

    #[test]
    fn only_published_viewable_items_are_public() {
        assert!(item(ContentStatus::Publish, true).is_public());
        assert!(!item(ContentStatus::Publish, false).is_public());
        assert!(!item(ContentStatus::Draft, true).is_public());
        assert!(!item(ContentStatus::Private, true).is_public());
    }
}
