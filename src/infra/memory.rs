use async_trait::async_trait;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::domain::engagement::{Comment, NewComment, NewPostLike, PostLike};
use crate::domain::media::{NewPostMedia, PostMedia};
use crate::domain::post::{NewPost, Post};
use crate::domain::social_graph::{Follow, NewFollow};
use crate::domain::user::{NewUser, User, UserChanges};
use crate::domain::Entity;
use crate::infra::store::{
    Store, StoreError, StoreResult, DUPLICATE_EMAIL, DUPLICATE_FOLLOW, DUPLICATE_LIKE,
};

/// Arena-backed store: every table is keyed by id and rows refer to each
/// other by id only. A single lock guards all tables, so a cascade is
/// observed atomically.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    media: BTreeMap<i64, PostMedia>,
    comments: BTreeMap<i64, Comment>,
    likes: BTreeMap<i64, PostLike>,
    follows: BTreeMap<i64, Follow>,
    user_ids: Sequence,
    post_ids: Sequence,
    media_ids: Sequence,
    comment_ids: Sequence,
    like_ids: Sequence,
    follow_ids: Sequence,
}

impl Tables {
    fn require_user(&self, id: i64) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::User))
        }
    }

    fn require_post(&self, id: i64) -> StoreResult<()> {
        if self.posts.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(Entity::Post))
        }
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn remove_post(&mut self, post_id: i64) -> bool {
        if self.posts.remove(&post_id).is_none() {
            return false;
        }
        self.media.retain(|_, media| media.post_id != post_id);
        self.comments.retain(|_, comment| comment.post_id != post_id);
        self.likes.retain(|_, like| like.post_id != post_id);
        true
    }

    fn remove_user(&mut self, user_id: i64) -> bool {
        if self.users.remove(&user_id).is_none() {
            return false;
        }

        let owned: Vec<i64> = self
            .posts
            .values()
            .filter(|post| post.user_id == user_id)
            .map(|post| post.id)
            .collect();
        for post_id in owned {
            self.remove_post(post_id);
        }

        self.comments.retain(|_, comment| comment.user_id != user_id);
        self.likes.retain(|_, like| like.user_id != user_id);
        self.follows
            .retain(|_, follow| follow.follower_id != user_id && follow.following_id != user_id);
        true
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::ConstraintViolation(DUPLICATE_EMAIL));
        }

        let user = User {
            id: tables.user_ids.next(),
            email: user.email,
            password: user.password,
            is_active: user.is_active,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::ConstraintViolation(DUPLICATE_EMAIL));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(user);
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_user(id))
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().cloned().collect())
    }

    async fn list_user_posts(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|post| post.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).cloned())
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        tables.require_user(post.user_id)?;

        let post = Post {
            id: tables.post_ids.next(),
            user_id: post.user_id,
            caption: post.caption,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete_post(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_post(id))
    }

    async fn list_post_media(&self, post_id: i64) -> StoreResult<Vec<PostMedia>> {
        let tables = self.tables.read().await;
        let mut media: Vec<PostMedia> = tables
            .media
            .values()
            .filter(|media| media.post_id == post_id)
            .cloned()
            .collect();
        media.sort_by_key(|media| (media.position, media.id));
        Ok(media)
    }

    async fn insert_post_media(&self, media: NewPostMedia) -> StoreResult<PostMedia> {
        let mut tables = self.tables.write().await;
        tables.require_post(media.post_id)?;

        let media = PostMedia {
            id: tables.media_ids.next(),
            post_id: media.post_id,
            media_url: media.media_url,
            media_type: media.media_type,
            position: media.position,
        };
        tables.media.insert(media.id, media.clone());
        Ok(media)
    }

    async fn delete_post_media(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.media.remove(&id).is_some())
    }

    async fn list_post_comments(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&id).cloned())
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        tables.require_post(comment.post_id)?;
        tables.require_user(comment.user_id)?;

        let comment = Comment {
            id: tables.comment_ids.next(),
            post_id: comment.post_id,
            user_id: comment.user_id,
            body: comment.body,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.remove(&id).is_some())
    }

    async fn list_post_likes(&self, post_id: i64) -> StoreResult<Vec<PostLike>> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .values()
            .filter(|like| like.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn insert_like(&self, like: NewPostLike) -> StoreResult<PostLike> {
        let mut tables = self.tables.write().await;
        tables.require_post(like.post_id)?;
        tables.require_user(like.user_id)?;
        let duplicate = tables
            .likes
            .values()
            .any(|existing| existing.post_id == like.post_id && existing.user_id == like.user_id);
        if duplicate {
            return Err(StoreError::ConstraintViolation(DUPLICATE_LIKE));
        }

        let like = PostLike {
            id: tables.like_ids.next(),
            post_id: like.post_id,
            user_id: like.user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.likes.insert(like.id, like.clone());
        Ok(like)
    }

    async fn delete_like(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.likes.remove(&id).is_some())
    }

    async fn list_followers(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|follow| follow.following_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_following(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|follow| follow.follower_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_follow(&self, id: i64) -> StoreResult<Option<Follow>> {
        let tables = self.tables.read().await;
        Ok(tables.follows.get(&id).cloned())
    }

    async fn insert_follow(&self, follow: NewFollow) -> StoreResult<Follow> {
        let mut tables = self.tables.write().await;
        tables.require_user(follow.follower_id)?;
        tables.require_user(follow.following_id)?;
        let duplicate = tables.follows.values().any(|existing| {
            existing.follower_id == follow.follower_id
                && existing.following_id == follow.following_id
        });
        if duplicate {
            return Err(StoreError::ConstraintViolation(DUPLICATE_FOLLOW));
        }

        let follow = Follow {
            id: tables.follow_ids.next(),
            follower_id: follow.follower_id,
            following_id: follow.following_id,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.follows.insert(follow.id, follow.clone());
        Ok(follow)
    }

    async fn delete_follow(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.follows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::MediaType;

    async fn seed_user(store: &MemoryStore, email: &str) -> User {
        store
            .insert_user(NewUser {
                email: email.to_string(),
                password: "secret".to_string(),
                is_active: true,
            })
            .await
            .unwrap()
    }

    async fn seed_post(store: &MemoryStore, user_id: i64) -> Post {
        store
            .insert_post(NewPost {
                user_id,
                caption: Some("hello".to_string()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn ids_are_assigned_in_insertion_order() {
        let store = MemoryStore::new();
        let first = seed_user(&store, "a@x.com").await;
        let second = seed_user(&store, "b@x.com").await;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        store.delete_user(second.id).await.unwrap();
        let third = seed_user(&store, "c@x.com").await;
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "a@x.com").await;

        let err = store
            .insert_user(NewUser {
                email: "a@x.com".to_string(),
                password: "other".to_string(),
                is_active: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(DUPLICATE_EMAIL)));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_to_taken_email_is_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "a@x.com").await;
        let second = seed_user(&store, "b@x.com").await;

        let changes = UserChanges {
            email: Some("a@x.com".to_string()),
            ..UserChanges::default()
        };
        let err = store.update_user(second.id, changes).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));

        // keeping one's own email is not a conflict
        let changes = UserChanges {
            email: Some("b@x.com".to_string()),
            ..UserChanges::default()
        };
        assert!(store.update_user(second.id, changes).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_like_is_rejected() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@x.com").await;
        let post = seed_post(&store, user.id).await;
        let like = NewPostLike {
            post_id: post.id,
            user_id: user.id,
        };

        store.insert_like(like.clone()).await.unwrap();
        let err = store.insert_like(like).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(DUPLICATE_LIKE)));
    }

    #[tokio::test]
    async fn follow_edges_are_directed_and_unique() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@x.com").await;
        let bob = seed_user(&store, "bob@x.com").await;

        store
            .insert_follow(NewFollow {
                follower_id: alice.id,
                following_id: bob.id,
            })
            .await
            .unwrap();
        // the reverse edge is a different pair
        store
            .insert_follow(NewFollow {
                follower_id: bob.id,
                following_id: alice.id,
            })
            .await
            .unwrap();
        let err = store
            .insert_follow(NewFollow {
                follower_id: alice.id,
                following_id: bob.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(DUPLICATE_FOLLOW)));

        // self-follow is not prevented
        store
            .insert_follow(NewFollow {
                follower_id: alice.id,
                following_id: alice.id,
            })
            .await
            .unwrap();

        assert_eq!(store.list_followers(bob.id).await.unwrap().len(), 1);
        assert_eq!(store.list_following(alice.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_parent_is_reported() {
        let store = MemoryStore::new();
        let err = store
            .insert_post(NewPost {
                user_id: 42,
                caption: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(Entity::User)));

        let user = seed_user(&store, "a@x.com").await;
        let err = store
            .insert_comment(NewComment {
                post_id: 7,
                user_id: user.id,
                body: "hi".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(Entity::Post)));
    }

    #[tokio::test]
    async fn media_is_ordered_by_position() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@x.com").await;
        let post = seed_post(&store, user.id).await;

        for (url, position) in [("b.jpg", 2), ("a.jpg", 0), ("c.mp4", 2)] {
            store
                .insert_post_media(NewPostMedia {
                    post_id: post.id,
                    media_url: url.to_string(),
                    media_type: MediaType::Image,
                    position,
                })
                .await
                .unwrap();
        }

        let urls: Vec<String> = store
            .list_post_media(post.id)
            .await
            .unwrap()
            .into_iter()
            .map(|media| media.media_url)
            .collect();
        assert_eq!(urls, vec!["a.jpg", "b.jpg", "c.mp4"]);
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice@x.com").await;
        let bob = seed_user(&store, "bob@x.com").await;

        let alice_post = seed_post(&store, alice.id).await;
        let bob_post = seed_post(&store, bob.id).await;
        store
            .insert_post_media(NewPostMedia {
                post_id: alice_post.id,
                media_url: "a.jpg".to_string(),
                media_type: MediaType::Image,
                position: 0,
            })
            .await
            .unwrap();

        // bob engages with alice's post, alice engages with bob's post
        store
            .insert_comment(NewComment {
                post_id: alice_post.id,
                user_id: bob.id,
                body: "nice".to_string(),
            })
            .await
            .unwrap();
        let alice_comment = store
            .insert_comment(NewComment {
                post_id: bob_post.id,
                user_id: alice.id,
                body: "thanks".to_string(),
            })
            .await
            .unwrap();
        store
            .insert_like(NewPostLike {
                post_id: bob_post.id,
                user_id: alice.id,
            })
            .await
            .unwrap();
        let follow = store
            .insert_follow(NewFollow {
                follower_id: bob.id,
                following_id: alice.id,
            })
            .await
            .unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());

        assert!(store.get_post(alice_post.id).await.unwrap().is_none());
        assert!(store.list_post_media(alice_post.id).await.unwrap().is_empty());
        assert!(store.list_post_comments(alice_post.id).await.unwrap().is_empty());
        assert!(store.get_comment(alice_comment.id).await.unwrap().is_none());
        assert!(store.list_post_likes(bob_post.id).await.unwrap().is_empty());
        assert!(store.get_follow(follow.id).await.unwrap().is_none());

        // bob's own data survives
        assert!(store.get_user(bob.id).await.unwrap().is_some());
        assert!(store.get_post(bob_post.id).await.unwrap().is_some());

        assert!(!store.delete_user(alice.id).await.unwrap());
    }
}
