use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A member of the chat platform, created lazily on first interaction.
/// Never deleted; only the timezone is ever updated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub external_id: String, // opaque platform id
    pub display_name: String,
    pub timezone: String, // IANA name, "UTC" until the user sets one
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(external_id: &str, display_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            display_name: display_name.to_string(),
            timezone: "UTC".to_string(),
            created_at: Utc::now(),
        }
    }
}
