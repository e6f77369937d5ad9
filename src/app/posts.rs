use std::sync::Arc;

use crate::app::{require_max_len, require_text};
use crate::domain::media::{NewPostMedia, PostMedia, MAX_MEDIA_URL_LEN};
use crate::domain::post::{NewPost, Post};
use crate::domain::Entity;
use crate::infra::store::{Store, StoreError, StoreResult};

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Store>,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        self.store.list_posts().await
    }

    pub async fn list_user_posts(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        self.require_user(user_id).await?;
        self.store.list_user_posts(user_id).await
    }

    pub async fn get_post(&self, post_id: i64) -> StoreResult<Post> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or(StoreError::NotFound(Entity::Post))
    }

    pub async fn create_post(&self, post: NewPost) -> StoreResult<Post> {
        self.store.insert_post(post).await
    }

    /// Media, comments and likes of the post go with it.
    pub async fn delete_post(&self, post_id: i64) -> StoreResult<()> {
        if self.store.delete_post(post_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::Post))
        }
    }

    pub async fn list_media(&self, post_id: i64) -> StoreResult<Vec<PostMedia>> {
        self.get_post(post_id).await?;
        self.store.list_post_media(post_id).await
    }

    pub async fn attach_media(&self, media: NewPostMedia) -> StoreResult<PostMedia> {
        require_text("media_url", &media.media_url)?;
        require_max_len("media_url", &media.media_url, MAX_MEDIA_URL_LEN)?;
        self.store.insert_post_media(media).await
    }

    pub async fn delete_media(&self, media_id: i64) -> StoreResult<()> {
        if self.store.delete_post_media(media_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::Media))
        }
    }

    async fn require_user(&self, user_id: i64) -> StoreResult<()> {
        match self.store.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(Entity::User)),
        }
    }
}
