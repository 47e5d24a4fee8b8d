//! Single-use reset tokens binding a verified OTP to the reset call.
//!
//! A successful verification mints a random token whose SHA-256 hash is
//! stored with a short TTL; the raw value is returned to the caller once
//! and never persisted. The reset call must present it back together with
//! the same email. Granting a new token invalidates any outstanding ones
//! for the address.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::Instrument;

/// Reset tokens live for ten minutes from the verification that minted them.
pub const RESET_TOKEN_TTL_SECONDS: i64 = 600;

/// Tolerated client/server clock skew when checking token expiry.
pub const RESET_TOKEN_SKEW_SECONDS: i64 = 5;

/// Create a new reset token. The raw value is only sent to the caller; the
/// store keeps a hash.
///
/// # Errors
/// Returns an error if the system RNG fails.
pub fn generate_reset_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate reset token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a reset token so the raw value never touches the database.
#[must_use]
pub fn hash_reset_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Capability interface over the reset-token store.
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn insert(
        &self,
        email: &str,
        token_hash: &[u8],
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Mark every unused token for the email as spent; returns the count.
    async fn invalidate_outstanding(&self, email: &str, now: DateTime<Utc>) -> Result<u64>;

    /// Atomically consume a matching unused, unexpired token. Returns
    /// whether one was found.
    async fn consume(&self, email: &str, token_hash: &[u8], now: DateTime<Utc>) -> Result<bool>;
}

/// Postgres-backed token store over `password_reset_tokens`.
#[derive(Clone)]
pub struct PgResetTokenStore {
    pool: PgPool,
}

impl PgResetTokenStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenStore {
    async fn insert(
        &self,
        email: &str,
        token_hash: &[u8],
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let query = r"
            INSERT INTO password_reset_tokens (email, token_hash, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(email)
            .bind(token_hash)
            .bind(created_at)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert reset token")?;
        Ok(())
    }

    async fn invalidate_outstanding(&self, email: &str, now: DateTime<Utc>) -> Result<u64> {
        let query = r"
            UPDATE password_reset_tokens
            SET used_at = $2
            WHERE email = $1 AND used_at IS NULL
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(email)
            .bind(now)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to invalidate reset tokens")?;
        Ok(result.rows_affected())
    }

    async fn consume(&self, email: &str, token_hash: &[u8], now: DateTime<Utc>) -> Result<bool> {
        let query = r"
            UPDATE password_reset_tokens
            SET used_at = $3
            WHERE email = $1
              AND token_hash = $2
              AND used_at IS NULL
              AND expires_at > $3
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(email)
            .bind(token_hash)
            .bind(now)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to consume reset token")?;
        Ok(result.rows_affected() > 0)
    }
}
