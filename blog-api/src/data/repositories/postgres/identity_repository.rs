use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::identity_repository::{IdentityPatch, IdentityRepository, NewIdentity};
use crate::domain::error::DomainError;
use crate::domain::identity::IdentityRecord;

#[derive(Debug, Clone)]
pub(crate) struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    uid: String,
    email: Option<String>,
    email_verified: bool,
    display_name: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn get_by_uid(&self, uid: &str) -> Result<Option<IdentityRecord>, DomainError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT uid, email, email_verified, display_name, photo_url, created_at, updated_at
             FROM identities WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_identity_db_error)?;

        Ok(row.map(map_identity_row))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DomainError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT uid, email, email_verified, display_name, photo_url, created_at, updated_at
            FROM identities
            WHERE LOWER(email) = LOWER($1)
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_identity_db_error)?;

        Ok(row.map(map_identity_row))
    }

    async fn create(&self, input: NewIdentity) -> Result<IdentityRecord, DomainError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            INSERT INTO identities (uid, email, email_verified, display_name, photo_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING uid, email, email_verified, display_name, photo_url, created_at, updated_at
            "#,
        )
        .bind(&input.uid)
        .bind(&input.email)
        .bind(input.email_verified)
        .bind(&input.display_name)
        .bind(&input.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_identity_db_error)?;

        Ok(map_identity_row(row))
    }

    async fn update(
        &self,
        uid: &str,
        patch: IdentityPatch,
    ) -> Result<IdentityRecord, DomainError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("UPDATE identities SET updated_at = NOW()");
        if let Some(display_name) = patch.display_name {
            qb.push(", display_name = ").push_bind(display_name);
        }
        if let Some(photo_url) = patch.photo_url {
            qb.push(", photo_url = ").push_bind(photo_url);
        }
        qb.push(" WHERE uid = ").push_bind(uid.to_string()).push(
            " RETURNING uid, email, email_verified, display_name, photo_url, created_at, updated_at",
        );

        let row = qb
            .build_query_as::<IdentityRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_identity_db_error)?;

        match row {
            Some(row) => Ok(map_identity_row(row)),
            None => Err(DomainError::NotFound("Identity".to_string())),
        }
    }
}

fn map_identity_row(row: IdentityRow) -> IdentityRecord {
    IdentityRecord {
        uid: row.uid,
        email: row.email,
        email_verified: row.email_verified,
        display_name: row.display_name,
        photo_url: row.photo_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn map_identity_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Upstream(err.to_string())
}
