pub mod engagement;
pub mod media;
pub mod post;
pub mod social_graph;
pub mod user;

use std::fmt;

/// Record kinds, used to name the missing side of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Post,
    Media,
    Comment,
    Like,
    Follow,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "User",
            Self::Post => "Post",
            Self::Media => "Media",
            Self::Comment => "Comment",
            Self::Like => "Like",
            Self::Follow => "Follow",
        };
        f.write_str(name)
    }
}
