//! Staff account persistence.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use super::models::{StaffRecord, StaffStatus};

/// Sort column for the staff listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaffOrder {
    #[default]
    CreatedAt,
    Name,
    Email,
}

impl StaffOrder {
    /// Map a query-string value onto a known column; anything else falls
    /// back to the default ordering rather than erroring.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "name" => Self::Name,
            "email" => Self::Email,
            _ => Self::CreatedAt,
        }
    }

    const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Name => "name",
            Self::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaffListFilter {
    pub status: Option<StaffStatus>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
    pub order: StaffOrder,
    pub ascending: bool,
}

/// Listing row; deliberately excludes the credential hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffPage {
    pub count: i64,
    pub data: Vec<StaffSummary>,
}

/// Capability interface over the staff account store.
#[async_trait]
pub trait StaffStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<StaffRecord>>;

    /// Overwrite the stored credential hash; returns affected row count.
    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<u64>;

    async fn list(&self, filter: &StaffListFilter) -> Result<StaffPage>;
}

/// Postgres-backed staff store.
#[derive(Clone)]
pub struct PgStaffStore {
    pool: PgPool,
}

impl PgStaffStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffStore for PgStaffStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StaffRecord>> {
        let query = r"
            SELECT id, name, email, role, status::text AS status,
                   password_hash, created_at, updated_at
            FROM staff
            WHERE email = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, StaffRecord>(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to fetch staff record")
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<u64> {
        let query = r"
            UPDATE staff
            SET password_hash = $2,
                updated_at = NOW()
            WHERE email = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update staff credential")?;
        Ok(result.rows_affected())
    }

    async fn list(&self, filter: &StaffListFilter) -> Result<StaffPage> {
        // Column and direction come from closed enums, never from the caller.
        let direction = if filter.ascending { "ASC" } else { "DESC" };
        let status = filter.status.map(StaffStatus::as_str);
        let pattern = filter
            .search
            .as_deref()
            .map(|needle| format!("%{needle}%"));

        let count_query = r"
            SELECT COUNT(*) AS total
            FROM staff
            WHERE ($1::text IS NULL OR status::text = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2 OR role ILIKE $2)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = count_query
        );
        let count: i64 = sqlx::query(count_query)
            .bind(status)
            .bind(pattern.as_deref())
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to count staff rows")?
            .get("total");

        let page_query = format!(
            r"
            SELECT id, name, email, role, status::text AS status, created_at
            FROM staff
            WHERE ($1::text IS NULL OR status::text = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2 OR role ILIKE $2)
            ORDER BY {} {direction}
            LIMIT $3 OFFSET $4
            ",
            filter.order.column()
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = page_query.as_str()
        );
        let rows = sqlx::query(&page_query)
            .bind(status)
            .bind(pattern.as_deref())
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list staff rows")?;

        let data = rows
            .into_iter()
            .map(|row| StaffSummary {
                id: row.get::<Uuid, _>("id").to_string(),
                name: row.get("name"),
                email: row.get("email"),
                role: row.get("role"),
                status: row.get("status"),
                created_at: row.get::<DateTime<Utc>, _>("created_at").to_rfc3339(),
            })
            .collect();

        Ok(StaffPage { count, data })
    }
}
