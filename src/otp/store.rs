//! OTP persistence.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;

use super::models::OtpRecord;

/// Capability interface over the append-only OTP store.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Insert a fresh record and return it with its assigned id.
    async fn insert(
        &self,
        email: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord>;

    /// The active record for an email: greatest `created_at`, insertion
    /// order breaking ties.
    async fn latest_by_email(&self, email: &str) -> Result<Option<OtpRecord>>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// Drop every record for the email whose deadline has passed; returns
    /// the number of rows removed.
    async fn delete_expired(&self, email: &str, now: DateTime<Utc>) -> Result<u64>;

    /// Bump the failed-attempt counter on a record.
    async fn record_failed_attempt(&self, id: i64) -> Result<()>;
}

/// Postgres-backed OTP store over `otp_codes`.
#[derive(Clone)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpStore {
    async fn insert(
        &self,
        email: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord> {
        let query = r"
            INSERT INTO otp_codes (email, code, attempts, created_at, expires_at)
            VALUES ($1, $2, 0, $3, $4)
            RETURNING id, email, code, attempts, created_at, expires_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query_as::<_, OtpRecord>(query)
            .bind(email)
            .bind(code)
            .bind(created_at)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert otp record")
    }

    async fn latest_by_email(&self, email: &str) -> Result<Option<OtpRecord>> {
        let query = r"
            SELECT id, email, code, attempts, created_at, expires_at
            FROM otp_codes
            WHERE email = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        sqlx::query_as::<_, OtpRecord>(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to fetch latest otp record")
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let query = "DELETE FROM otp_codes WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete otp record")?;
        Ok(())
    }

    async fn delete_expired(&self, email: &str, now: DateTime<Utc>) -> Result<u64> {
        let query = "DELETE FROM otp_codes WHERE email = $1 AND expires_at <= $2";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(email)
            .bind(now)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to sweep expired otp records")?;
        Ok(result.rows_affected())
    }

    async fn record_failed_attempt(&self, id: i64) -> Result<()> {
        let query = "UPDATE otp_codes SET attempts = attempts + 1 WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to record otp attempt")?;
        Ok(())
    }
}
