use std::sync::Arc;

use crate::app::{require_max_len, require_text};
use crate::domain::user::{NewUser, User, UserChanges, MAX_EMAIL_LEN, MAX_PASSWORD_LEN};
use crate::domain::Entity;
use crate::infra::store::{Store, StoreError, StoreResult};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.store.list_users().await
    }

    pub async fn get_user(&self, user_id: i64) -> StoreResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(StoreError::NotFound(Entity::User))
    }

    pub async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        require_text("email", &user.email)?;
        require_max_len("email", &user.email, MAX_EMAIL_LEN)?;
        require_text("password", &user.password)?;
        require_max_len("password", &user.password, MAX_PASSWORD_LEN)?;
        self.store.insert_user(user).await
    }

    /// Applies only the fields present in `changes`; nothing is written if
    /// any of them is invalid.
    pub async fn update_user(&self, user_id: i64, changes: UserChanges) -> StoreResult<User> {
        if let Some(email) = &changes.email {
            require_text("email", email)?;
            require_max_len("email", email, MAX_EMAIL_LEN)?;
        }
        if let Some(password) = &changes.password {
            require_text("password", password)?;
            require_max_len("password", password, MAX_PASSWORD_LEN)?;
        }
        if changes.is_empty() {
            return self.get_user(user_id).await;
        }

        self.store
            .update_user(user_id, changes)
            .await?
            .ok_or(StoreError::NotFound(Entity::User))
    }

    /// Removes the user together with their posts, comments, likes and
    /// follow edges.
    pub async fn delete_user(&self, user_id: i64) -> StoreResult<()> {
        if self.store.delete_user(user_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::User))
        }
    }
}
