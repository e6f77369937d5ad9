use std::sync::Arc;

use crate::app::require_text;
use crate::domain::engagement::{Comment, NewComment, NewPostLike, PostLike};
use crate::domain::Entity;
use crate::infra::store::{Store, StoreError, StoreResult};

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn Store>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn comment_post(&self, comment: NewComment) -> StoreResult<Comment> {
        require_text("body", &comment.body)?;
        self.store.insert_comment(comment).await
    }

    pub async fn list_comments(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        self.require_post(post_id).await?;
        self.store.list_post_comments(post_id).await
    }

    pub async fn get_comment(&self, comment_id: i64) -> StoreResult<Comment> {
        self.store
            .get_comment(comment_id)
            .await?
            .ok_or(StoreError::NotFound(Entity::Comment))
    }

    pub async fn delete_comment(&self, comment_id: i64) -> StoreResult<()> {
        if self.store.delete_comment(comment_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::Comment))
        }
    }

    /// Fails with a constraint violation if the user already liked the post.
    pub async fn like_post(&self, like: NewPostLike) -> StoreResult<PostLike> {
        self.store.insert_like(like).await
    }

    pub async fn list_likes(&self, post_id: i64) -> StoreResult<Vec<PostLike>> {
        self.require_post(post_id).await?;
        self.store.list_post_likes(post_id).await
    }

    pub async fn unlike(&self, like_id: i64) -> StoreResult<()> {
        if self.store.delete_like(like_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::Like))
        }
    }

    async fn require_post(&self, post_id: i64) -> StoreResult<()> {
        match self.store.get_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(Entity::Post)),
        }
    }
}
