use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    Health,
    Delivery,
    Maintenance,
    Weather,
    Production,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    /// Relative time label, e.g. "5 minutes ago"
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub read: bool,
}

fn notification(
    kind: NotificationKind,
    title: &str,
    description: &str,
    time: &str,
    avatar: Option<&str>,
    read: bool,
) -> Notification {
    Notification {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        time: time.to_string(),
        avatar: avatar.map(str::to_string),
        read,
    }
}

/// The fixed notification feed, newest first.
pub fn notifications() -> Vec<Notification> {
    vec![
        notification(
            NotificationKind::Alert,
            "High Methane Level Detected",
            "Barn 3 methane levels above threshold",
            "5 minutes ago",
            None,
            false,
        ),
        notification(
            NotificationKind::Health,
            "Cow Health Alert",
            "Bessie showing irregular activity patterns. Veterinary check recommended.",
            "30 minutes ago",
            Some("/vet.jpg"),
            false,
        ),
        notification(
            NotificationKind::Delivery,
            "Feed Delivery Scheduled",
            "Ordered Probiotics arriving tomorrow at 08:00",
            "1 hour ago",
            None,
            false,
        ),
        notification(
            NotificationKind::Maintenance,
            "Equipment Maintenance Due",
            "Automated milking system in Parlor 2 requires scheduled maintenance",
            "4 hours ago",
            None,
            true,
        ),
        notification(
            NotificationKind::Weather,
            "Weather Alert",
            "Heavy rain forecast for next 24 hours. Check barn drainage systems.",
            "5 hours ago",
            None,
            true,
        ),
        notification(
            NotificationKind::Production,
            "Milk Production Report",
            "Daily yield: 2,450 gallons. 3% above weekly average.",
            "Yesterday",
            None,
            true,
        ),
    ]
}

pub fn unread_count(items: &[Notification]) -> usize {
    items.iter().filter(|n| !n.read).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_count() {
        let items = notifications();
        assert_eq!(items.len(), 6);
        assert_eq!(unread_count(&items), 3);
    }

    #[test]
    fn test_avatar_omitted_when_absent() {
        let json = serde_json::to_value(&notifications()[0]).unwrap();
        assert_eq!(json["type"], "alert");
        assert!(json.get("avatar").is_none());
    }
}
