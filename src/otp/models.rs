use chrono::{DateTime, Utc};
use sqlx::{FromRow, Row, postgres::PgRow};

/// A single issued one-time password.
///
/// Rows are append-only: several may coexist for one email, and the one
/// with the greatest `created_at` (ties broken by `id`, which follows
/// insertion order) is the only one verification looks at. Earlier rows
/// become unreachable as soon as a later one exists.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: i64,
    pub email: String,
    /// Fixed-width 6-digit numeric string; compared as text, never parsed.
    pub code: String,
    /// Failed verification attempts against this record.
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl<'r> FromRow<'r, PgRow> for OtpRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            code: row.try_get("code")?,
            attempts: row.try_get("attempts")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

/// Result of checking a submitted code against the active record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched; the record was consumed.
    Verified,
    /// No record exists for the email; the caller must request a new code.
    NotFound,
    /// The active record was past its TTL; it has been cleaned up.
    Expired,
    /// Code mismatch; the record survives for a limited retry.
    InvalidCode,
    /// Too many failed attempts; the record is frozen until it expires.
    Locked,
}
