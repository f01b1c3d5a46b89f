//! Postgres-backed post repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engage_core::models::{NewPost, PostAttributes, PostRecord};
use engage_core::AppError;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::store::PostStore;

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    image_url: String,
    platform: String,
    niche: Option<String>,
    goal: Option<String>,
    tone: Option<String>,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        PostRecord {
            id: row.id,
            image_url: row.image_url,
            platform: row.platform,
            niche: row.niche,
            goal: row.goal,
            tone: row.tone,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

fn db_err(err: sqlx::Error) -> AppError {
    AppError::Database(err.to_string())
}

/// Post repository backed by the `posts` table.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepository {
    #[tracing::instrument(skip(self, new_post), fields(db.table = "posts", db.operation = "insert"))]
    async fn insert(&self, new_post: NewPost) -> Result<PostRecord, AppError> {
        let row: PostRow = sqlx::query_as::<Postgres, PostRow>(
            r#"
            INSERT INTO posts (id, image_url, platform, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, image_url, platform, niche, goal, tone, user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_post.image_url)
        .bind(&new_post.platform)
        .bind(new_post.user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self, attributes), fields(db.table = "posts", db.operation = "update", post_id = %id))]
    async fn update_attributes(
        &self,
        id: Uuid,
        attributes: &PostAttributes,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET platform = $1, niche = $2, goal = $3, tone = $4
            WHERE id = $5
            "#,
        )
        .bind(attributes.platform.as_str())
        .bind(&attributes.niche)
        .bind(attributes.goal.as_str())
        .bind(attributes.tone.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("post {} not found", id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select", post_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<PostRecord>, AppError> {
        let row: Option<PostRow> = sqlx::query_as::<Postgres, PostRow>(
            r#"
            SELECT id, image_url, platform, niche, goal, tone, user_id, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }
}
