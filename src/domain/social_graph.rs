use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Directed edge: `follower_id` follows `following_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFollow {
    pub follower_id: i64,
    pub following_id: i64,
}
