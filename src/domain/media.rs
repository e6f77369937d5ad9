use serde::{Deserialize, Serialize};

pub const MAX_MEDIA_URL_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMedia {
    pub id: i64,
    pub post_id: i64,
    pub media_url: String,
    pub media_type: MediaType,
    pub position: i32,
}

#[derive(Debug, Clone)]
pub struct NewPostMedia {
    pub post_id: i64,
    pub media_url: String,
    pub media_type: MediaType,
    pub position: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}
