use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{
    NewPost, Pagination, PostListFilter, PostOwnership, PostPatch, PostRepository, SortOrder,
};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus, PostSummary};
use crate::domain::profile::AuthorRef;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: String,
    title: String,
    content: Value,
    summary: Option<String>,
    cover_image_url: Option<String>,
    status: String,
    views_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    author_display_name: Option<String>,
    author_avatar_url: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    id: i64,
    author_id: String,
    title: String,
    summary: Option<String>,
    cover_image_url: Option<String>,
    status: String,
    views_count: i64,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    author_display_name: Option<String>,
    author_avatar_url: Option<String>,
}

#[derive(sqlx::FromRow)]
struct OwnershipRow {
    author_id: String,
    published_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (author_id, title, content, summary, cover_image_url, status, published_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT i.id, i.author_id, i.title, i.content, i.summary, i.cover_image_url,
                   i.status, i.views_count, i.created_at, i.updated_at, i.published_at, i.deleted_at,
                   pr.display_name AS author_display_name, pr.avatar_url AS author_avatar_url
            FROM inserted i
            JOIN profiles pr ON pr.id = i.author_id
            "#,
        )
        .bind(&input.author_id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.summary)
        .bind(&input.cover_image_url)
        .bind(input.status.as_str())
        .bind(input.published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_post_row(row)
    }

    async fn get_live(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.author_id, p.title, p.content, p.summary, p.cover_image_url,
                   p.status, p.views_count, p.created_at, p.updated_at, p.published_at, p.deleted_at,
                   pr.display_name AS author_display_name, pr.avatar_url AS author_avatar_url
            FROM posts p
            JOIN profiles pr ON pr.id = p.author_id
            WHERE p.id = $1 AND p.deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_post_row).transpose()
    }

    async fn exists_live(&self, id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)
    }

    async fn ownership(&self, id: i64) -> Result<Option<PostOwnership>, DomainError> {
        let row = sqlx::query_as::<_, OwnershipRow>(
            "SELECT author_id, published_at FROM posts WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(|row| PostOwnership {
            author_id: row.author_id,
            published_at: row.published_at,
        }))
    }

    async fn update(&self, id: i64, patch: PostPatch) -> Result<Post, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "WITH updated AS (UPDATE posts SET updated_at = NOW()",
        );
        if let Some(title) = patch.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(content) = patch.content {
            qb.push(", content = ").push_bind(content);
        }
        if let Some(summary) = patch.summary {
            qb.push(", summary = ").push_bind(summary);
        }
        if let Some(cover_image_url) = patch.cover_image_url {
            qb.push(", cover_image_url = ").push_bind(cover_image_url);
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(published_at) = patch.published_at {
            qb.push(", published_at = ").push_bind(published_at);
        }
        qb.push(" WHERE id = ").push_bind(id).push(
            r#" AND deleted_at IS NULL RETURNING *)
            SELECT u.id, u.author_id, u.title, u.content, u.summary, u.cover_image_url,
                   u.status, u.views_count, u.created_at, u.updated_at, u.published_at, u.deleted_at,
                   pr.display_name AS author_display_name, pr.avatar_url AS author_avatar_url
            FROM updated u
            JOIN profiles pr ON pr.id = u.author_id"#,
        );

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        match row {
            Some(row) => map_post_row(row),
            None => Err(DomainError::NotFound("Post".to_string())),
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE posts SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        filter: PostListFilter,
        pagination: Pagination,
    ) -> Result<(Vec<PostSummary>, i64), DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"SELECT p.id, p.author_id, p.title, p.summary, p.cover_image_url,
                      p.status, p.views_count, p.created_at, p.published_at,
                      pr.display_name AS author_display_name, pr.avatar_url AS author_avatar_url
               FROM posts p
               JOIN profiles pr ON pr.id = p.author_id
               WHERE p.deleted_at IS NULL"#,
        );
        push_filters(&mut qb, &filter);

        qb.push(" ORDER BY p.").push(filter.sort_by.column());
        match filter.sort_order {
            SortOrder::Asc => qb.push(" ASC"),
            SortOrder::Desc => qb.push(" DESC NULLS LAST"),
        };
        qb.push(", p.id DESC");
        qb.push(" LIMIT ")
            .push_bind(pagination.limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb
            .build_query_as::<PostSummaryRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        let mut count_qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM posts p WHERE p.deleted_at IS NULL",
        );
        push_filters(&mut count_qb, &filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        let items = rows
            .into_iter()
            .map(map_summary_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn increment_view(
        &self,
        id: i64,
        viewer_id: Option<&str>,
        viewer_ip: Option<&str>,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT increment_post_view($1, $2, $3)")
            .bind(id)
            .bind(viewer_id)
            .bind(viewer_ip)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostListFilter) {
    qb.push(" AND p.status = ").push_bind(filter.status.as_str());
    if let Some(author_id) = &filter.author_id {
        qb.push(" AND p.author_id = ").push_bind(author_id.clone());
    }
    if let Some(search) = &filter.search {
        qb.push(" AND p.title ILIKE ")
            .push_bind(format!("%{}%", escape_like(search)));
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_post_row(row: PostRow) -> Result<Post, DomainError> {
    Ok(Post {
        id: row.id,
        author: Some(AuthorRef {
            id: row.author_id.clone(),
            display_name: row.author_display_name,
            avatar_url: row.author_avatar_url,
        }),
        author_id: row.author_id,
        title: row.title,
        content: row.content,
        summary: row.summary,
        cover_image_url: row.cover_image_url,
        status: PostStatus::parse(&row.status)?,
        views_count: row.views_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
        published_at: row.published_at,
        deleted_at: row.deleted_at,
    })
}

fn map_summary_row(row: PostSummaryRow) -> Result<PostSummary, DomainError> {
    Ok(PostSummary {
        id: row.id,
        author: Some(AuthorRef {
            id: row.author_id.clone(),
            display_name: row.author_display_name,
            avatar_url: row.author_avatar_url,
        }),
        author_id: row.author_id,
        title: row.title,
        summary: row.summary,
        cover_image_url: row.cover_image_url,
        status: PostStatus::parse(&row.status)?,
        views_count: row.views_count,
        created_at: row.created_at,
        published_at: row.published_at,
    })
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("Author".to_string());
    }
    DomainError::Upstream(err.to_string())
}
