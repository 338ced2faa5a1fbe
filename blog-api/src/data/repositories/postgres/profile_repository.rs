use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::profile_repository::{NewProfile, ProfilePatch, ProfileRepository};
use crate::domain::error::DomainError;
use crate::domain::profile::{Profile, Role};

#[derive(Debug, Clone)]
pub(crate) struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    email: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn get(&self, id: &str) -> Result<Option<Profile>, DomainError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, display_name, avatar_url, bio, role, created_at, updated_at
             FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_profile_db_error)?;

        row.map(map_profile_row).transpose()
    }

    async fn insert(&self, input: NewProfile) -> Result<Profile, DomainError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, email, display_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, display_name, avatar_url, bio, role, created_at, updated_at
            "#,
        )
        .bind(&input.id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(&input.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_profile_db_error)?;

        map_profile_row(row)
    }

    async fn update(&self, id: &str, patch: ProfilePatch) -> Result<Option<Profile>, DomainError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("UPDATE profiles SET updated_at = NOW()");
        if let Some(display_name) = patch.display_name {
            qb.push(", display_name = ").push_bind(display_name);
        }
        if let Some(avatar_url) = patch.avatar_url {
            qb.push(", avatar_url = ").push_bind(avatar_url);
        }
        if let Some(bio) = patch.bio {
            qb.push(", bio = ").push_bind(bio);
        }
        qb.push(" WHERE id = ")
            .push_bind(id.to_string())
            .push(" RETURNING id, email, display_name, avatar_url, bio, role, created_at, updated_at");

        let row = qb
            .build_query_as::<ProfileRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_profile_db_error)?;

        row.map(map_profile_row).transpose()
    }
}

fn map_profile_row(row: ProfileRow) -> Result<Profile, DomainError> {
    Ok(Profile {
        id: row.id,
        email: row.email,
        display_name: row.display_name,
        avatar_url: row.avatar_url,
        bio: row.bio,
        role: Role::parse(&row.role)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_profile_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Upstream(err.to_string())
}
