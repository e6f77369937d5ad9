use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::engagement::{Comment, NewComment, NewPostLike, PostLike};
use crate::domain::media::{MediaType, NewPostMedia, PostMedia};
use crate::domain::post::{NewPost, Post};
use crate::domain::social_graph::{Follow, NewFollow};
use crate::domain::user::{NewUser, User, UserChanges};
use crate::domain::Entity;
use crate::infra::db::Db;
use crate::infra::store::{
    Store, StoreError, StoreResult, DUPLICATE_EMAIL, DUPLICATE_FOLLOW, DUPLICATE_LIKE,
};

const USER_COLUMNS: &str = "id, email, password, is_active";
const POST_COLUMNS: &str = "id, user_id, caption, created_at";
const MEDIA_COLUMNS: &str = "id, post_id, media_url, media_type, position";
const COMMENT_COLUMNS: &str = "id, post_id, user_id, body, created_at";
const LIKE_COLUMNS: &str = "id, post_id, user_id, created_at";
const FOLLOW_COLUMNS: &str = "id, follower_id, following_id, created_at";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password: row.get("password"),
        is_active: row.get("is_active"),
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        caption: row.get("caption"),
        created_at: row.get("created_at"),
    }
}

fn media_from_row(row: &PgRow) -> StoreResult<PostMedia> {
    let media_type: String = row.get("media_type");
    let media_type = MediaType::from_db(&media_type).ok_or_else(|| {
        sqlx::Error::Decode(format!("unknown media_type: {}", media_type).into())
    })?;

    Ok(PostMedia {
        id: row.get("id"),
        post_id: row.get("post_id"),
        media_url: row.get("media_url"),
        media_type,
        position: row.get("position"),
    })
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        body: row.get("body"),
        created_at: row.get("created_at"),
    }
}

fn like_from_row(row: &PgRow) -> PostLike {
    PostLike {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

fn follow_from_row(row: &PgRow) -> Follow {
    Follow {
        id: row.get("id"),
        follower_id: row.get("follower_id"),
        following_id: row.get("following_id"),
        created_at: row.get("created_at"),
    }
}

/// Translates constraint failures into their domain meaning.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.is_unique_violation() {
            match constraint {
                "users_email_key" => return StoreError::ConstraintViolation(DUPLICATE_EMAIL),
                "uq_like_post_user" => return StoreError::ConstraintViolation(DUPLICATE_LIKE),
                "uq_follow_pair" => return StoreError::ConstraintViolation(DUPLICATE_FOLLOW),
                _ => {}
            }
        }
        if db_err.is_foreign_key_violation() {
            // posts_user_id_fkey, comments_post_id_fkey, follows_follower_id_fkey, ...
            let entity = if constraint.ends_with("post_id_fkey") {
                Entity::Post
            } else {
                Entity::User
            };
            return StoreError::NotFound(entity);
        }
        // string_data_right_truncation
        if db_err.code().as_deref() == Some("22001") {
            return StoreError::Invalid(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for Db {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(self.pool())
            .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (email, password, is_active) VALUES ($1, $2, $3) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.email)
        .bind(user.password)
        .bind(user.is_active)
        .fetch_one(self.pool())
        .await
        .map_err(map_write_error)?;

        Ok(user_from_row(&row))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE users \
             SET email = COALESCE($2, email), \
                 password = COALESCE($3, password), \
                 is_active = COALESCE($4, is_active) \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(changes.email)
        .bind(changes.password)
        .bind(changes.is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(map_write_error)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        // ON DELETE CASCADE removes posts, comments, likes and follow edges
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query(&format!("SELECT {} FROM posts ORDER BY id", POST_COLUMNS))
            .fetch_all(self.pool())
            .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn list_user_posts(&self, user_id: i64) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE user_id = $1 ORDER BY id",
            POST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (user_id, caption) VALUES ($1, $2) RETURNING {}",
            POST_COLUMNS
        ))
        .bind(post.user_id)
        .bind(post.caption)
        .fetch_one(self.pool())
        .await
        .map_err(map_write_error)?;

        Ok(post_from_row(&row))
    }

    async fn delete_post(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_post_media(&self, post_id: i64) -> StoreResult<Vec<PostMedia>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM post_media WHERE post_id = $1 ORDER BY position, id",
            MEDIA_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(media_from_row).collect()
    }

    async fn insert_post_media(&self, media: NewPostMedia) -> StoreResult<PostMedia> {
        let row = sqlx::query(&format!(
            "INSERT INTO post_media (post_id, media_url, media_type, position) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            MEDIA_COLUMNS
        ))
        .bind(media.post_id)
        .bind(media.media_url)
        .bind(media.media_type.as_db())
        .bind(media.position)
        .fetch_one(self.pool())
        .await
        .map_err(map_write_error)?;

        media_from_row(&row)
    }

    async fn delete_post_media(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM post_media WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_post_comments(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE post_id = $1 ORDER BY id",
            COMMENT_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let row = sqlx::query(&format!(
            "INSERT INTO comments (post_id, user_id, body) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(comment.body)
        .fetch_one(self.pool())
        .await
        .map_err(map_write_error)?;

        Ok(comment_from_row(&row))
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_post_likes(&self, post_id: i64) -> StoreResult<Vec<PostLike>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM post_likes WHERE post_id = $1 ORDER BY id",
            LIKE_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(like_from_row).collect())
    }

    async fn insert_like(&self, like: NewPostLike) -> StoreResult<PostLike> {
        let row = sqlx::query(&format!(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) RETURNING {}",
            LIKE_COLUMNS
        ))
        .bind(like.post_id)
        .bind(like.user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_write_error)?;

        Ok(like_from_row(&row))
    }

    async fn delete_like(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM post_likes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_followers(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM follows WHERE following_id = $1 ORDER BY id",
            FOLLOW_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(follow_from_row).collect())
    }

    async fn list_following(&self, user_id: i64) -> StoreResult<Vec<Follow>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM follows WHERE follower_id = $1 ORDER BY id",
            FOLLOW_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(follow_from_row).collect())
    }

    async fn get_follow(&self, id: i64) -> StoreResult<Option<Follow>> {
        let row = sqlx::query(&format!("SELECT {} FROM follows WHERE id = $1", FOLLOW_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(follow_from_row))
    }

    async fn insert_follow(&self, follow: NewFollow) -> StoreResult<Follow> {
        let row = sqlx::query(&format!(
            "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) RETURNING {}",
            FOLLOW_COLUMNS
        ))
        .bind(follow.follower_id)
        .bind(follow.following_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_write_error)?;

        Ok(follow_from_row(&row))
    }

    async fn delete_follow(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
