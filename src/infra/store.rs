use async_trait::async_trait;

use crate::domain::engagement::{Comment, NewComment, NewPostLike, PostLike};
use crate::domain::media::{NewPostMedia, PostMedia};
use crate::domain::post::{NewPost, Post};
use crate::domain::social_graph::{Follow, NewFollow};
use crate::domain::user::{NewUser, User, UserChanges};
use crate::domain::Entity;

pub const DUPLICATE_EMAIL: &str = "Email already registered";
pub const DUPLICATE_LIKE: &str = "Post already liked by this user";
pub const DUPLICATE_FOLLOW: &str = "Follow already exists";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for every entity in the schema.
///
/// Lookups return `None` and deletes return `false` when the id is absent.
/// Inserts fail with [`StoreError::NotFound`] when a referenced parent is
/// missing and with [`StoreError::ConstraintViolation`] on a uniqueness
/// conflict. Deletes cascade to dependent rows.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;

    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn list_user_posts(&self, user_id: i64) -> StoreResult<Vec<Post>>;
    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>>;
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post>;
    async fn delete_post(&self, id: i64) -> StoreResult<bool>;

    /// Ordered by position, then id.
    async fn list_post_media(&self, post_id: i64) -> StoreResult<Vec<PostMedia>>;
    async fn insert_post_media(&self, media: NewPostMedia) -> StoreResult<PostMedia>;
    async fn delete_post_media(&self, id: i64) -> StoreResult<bool>;

    async fn list_post_comments(&self, post_id: i64) -> StoreResult<Vec<Comment>>;
    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>>;
    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    async fn delete_comment(&self, id: i64) -> StoreResult<bool>;

    async fn list_post_likes(&self, post_id: i64) -> StoreResult<Vec<PostLike>>;
    async fn insert_like(&self, like: NewPostLike) -> StoreResult<PostLike>;
    async fn delete_like(&self, id: i64) -> StoreResult<bool>;

    /// Edges pointing at `user_id`.
    async fn list_followers(&self, user_id: i64) -> StoreResult<Vec<Follow>>;
    /// Edges leaving `user_id`.
    async fn list_following(&self, user_id: i64) -> StoreResult<Vec<Follow>>;
    async fn get_follow(&self, id: i64) -> StoreResult<Option<Follow>>;
    async fn insert_follow(&self, follow: NewFollow) -> StoreResult<Follow>;
    async fn delete_follow(&self, id: i64) -> StoreResult<bool>;
}
