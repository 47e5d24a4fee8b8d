use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

/// Account status as persisted in `staff.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
    Active,
    Inactive,
}

impl StaffStatus {
    /// Parse the persisted textual value into a typed enum.
    pub fn from_db(value: &str) -> Result<Self, sqlx::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid staff.status value: {value}"),
            )))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaffRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: StaffStatus,
    /// Argon2 PHC string; the plaintext credential is never stored.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffRecord {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }
}

impl<'r> FromRow<'r, PgRow> for StaffRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: row.try_get("role")?,
            status: StaffStatus::from_db(&status)?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values() {
        assert_eq!(StaffStatus::from_db("active").ok(), Some(StaffStatus::Active));
        assert_eq!(
            StaffStatus::from_db("inactive").ok(),
            Some(StaffStatus::Inactive)
        );
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert!(StaffStatus::from_db("suspended").is_err());
        assert!(StaffStatus::from_db("").is_err());
    }

    #[test]
    fn status_round_trips_as_str() {
        for status in [StaffStatus::Active, StaffStatus::Inactive] {
            assert_eq!(StaffStatus::from_db(status.as_str()).ok(), Some(status));
        }
    }
}
