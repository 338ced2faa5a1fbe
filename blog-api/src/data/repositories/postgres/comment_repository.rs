use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::profile::AuthorRef;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: String,
    parent_id: Option<i64>,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    author_display_name: Option<String>,
    author_avatar_url: Option<String>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, parent_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT i.id, i.post_id, i.author_id, i.parent_id, i.content,
                   i.created_at, i.updated_at, i.deleted_at,
                   pr.display_name AS author_display_name, pr.avatar_url AS author_avatar_url
            FROM inserted i
            JOIN profiles pr ON pr.id = i.author_id
            "#,
        )
        .bind(input.post_id)
        .bind(&input.author_id)
        .bind(input.parent_id)
        .bind(&input.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(map_comment_row(row))
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.author_id, c.parent_id, c.content,
                   c.created_at, c.updated_at, c.deleted_at,
                   pr.display_name AS author_display_name, pr.avatar_url AS author_avatar_url
            FROM comments c
            JOIN profiles pr ON pr.id = c.author_id
            WHERE c.post_id = $1 AND c.deleted_at IS NULL
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(map_comment_row).collect())
    }

    async fn author_of_live(&self, id: i64) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar::<_, String>(
            "SELECT author_id FROM comments WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH updated AS (
                UPDATE comments SET content = $2, updated_at = NOW()
                WHERE id = $1 AND deleted_at IS NULL
                RETURNING *
            )
            SELECT u.id, u.post_id, u.author_id, u.parent_id, u.content,
                   u.created_at, u.updated_at, u.deleted_at,
                   pr.display_name AS author_display_name, pr.avatar_url AS author_avatar_url
            FROM updated u
            JOIN profiles pr ON pr.id = u.author_id
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        match row {
            Some(row) => Ok(map_comment_row(row)),
            None => Err(DomainError::NotFound("Comment".to_string())),
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE comments SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_comment_row(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        post_id: row.post_id,
        author: Some(AuthorRef {
            id: row.author_id.clone(),
            display_name: row.author_display_name,
            avatar_url: row.author_avatar_url,
        }),
        author_id: row.author_id,
        parent_id: row.parent_id,
        content: row.content,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("Post".to_string());
    }
    DomainError::Upstream(err.to_string())
}
