use std::sync::Arc;

use crate::domain::social_graph::{Follow, NewFollow};
use crate::domain::Entity;
use crate::infra::store::{Store, StoreError, StoreResult};

#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn Store>,
}

impl SocialService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Self-follows are accepted; a repeated edge is a constraint violation.
    pub async fn follow(&self, follow: NewFollow) -> StoreResult<Follow> {
        self.store.insert_follow(follow).await
    }

    pub async fn get_follow(&self, follow_id: i64) -> StoreResult<Follow> {
        self.store
            .get_follow(follow_id)
            .await?
            .ok_or(StoreError::NotFound(Entity::Follow))
    }

    pub async fn unfollow(&self, follow_id: i64) -> StoreResult<()> {
        if self.store.delete_follow(follow_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::Follow))
        }
    }

    pub async fn list_followers(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        self.require_user(user_id).await?;
        self.store.list_followers(user_id).await
    }

    pub async fn list_following(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        self.require_user(user_id).await?;
        self.store.list_following(user_id).await
    }

    async fn require_user(&self, user_id: i64) -> StoreResult<()> {
        match self.store.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(Entity::User)),
        }
    }
}
