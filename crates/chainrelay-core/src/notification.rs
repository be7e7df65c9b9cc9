//! Notification and subscription records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of events a subscription watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationCategory {
    NewThread,
    NewComment,
    NewMention,
    Reaction,
    ChainEvent,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::NewThread => "new-thread",
            NotificationCategory::NewComment => "new-comment",
            NotificationCategory::NewMention => "new-mention",
            NotificationCategory::Reaction => "reaction",
            NotificationCategory::ChainEvent => "chain-event",
        }
    }

    /// High-salience categories are never hidden inside a batch; a group
    /// containing one is exploded back into singletons.
    pub fn is_high_salience(&self) -> bool {
        matches!(
            self,
            NotificationCategory::NewComment | NotificationCategory::NewMention
        )
    }
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new-thread" => Ok(NotificationCategory::NewThread),
            "new-comment" => Ok(NotificationCategory::NewComment),
            "new-mention" => Ok(NotificationCategory::NewMention),
            "reaction" => Ok(NotificationCategory::Reaction),
            "chain-event" => Ok(NotificationCategory::ChainEvent),
            other => Err(format!("unknown notification category: {other}")),
        }
    }
}

/// A user's registered interest in a category of events tied to a specific
/// object. Created by user action outside this pipeline; consumed read-only
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub category: NotificationCategory,
    /// The object being watched: a thread id, comment id, or chain entity key
    pub object_id: String,
    pub subscriber_id: i64,
}

/// A notification created for one subscription, optionally tied to a
/// persisted chain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub subscription: Subscription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_event_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names() {
        assert_eq!(NotificationCategory::NewComment.as_str(), "new-comment");
        assert_eq!(NotificationCategory::ChainEvent.as_str(), "chain-event");
        let json = serde_json::to_string(&NotificationCategory::NewMention).unwrap();
        assert_eq!(json, "\"new-mention\"");
    }

    #[test]
    fn salience_covers_comments_and_mentions_only() {
        assert!(NotificationCategory::NewComment.is_high_salience());
        assert!(NotificationCategory::NewMention.is_high_salience());
        assert!(!NotificationCategory::Reaction.is_high_salience());
        assert!(!NotificationCategory::ChainEvent.is_high_salience());
        assert!(!NotificationCategory::NewThread.is_high_salience());
    }
}
