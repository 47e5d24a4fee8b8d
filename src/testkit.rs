//! In-memory doubles for the store, mail, and clock seams.
//!
//! Compiled for tests only. Each double mirrors the contract of its
//! Postgres/SMTP counterpart closely enough that the recovery flow can be
//! exercised end to end without external services.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use uuid::Uuid;

use crate::clock::Clock;
use crate::mail::{MailSender, OutgoingEmail};
use crate::otp::models::OtpRecord;
use crate::otp::store::OtpStore;
use crate::recovery::tokens::ResetTokenStore;
use crate::staff::models::{StaffRecord, StaffStatus};
use crate::staff::password::hash_password;
use crate::staff::store::{StaffListFilter, StaffOrder, StaffPage, StaffStore, StaffSummary};

/// Deterministic, manually advanced clock.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = DateTime::from_timestamp(1_700_000_000, 0).expect("valid epoch");
        Self {
            now: Mutex::new(start),
        }
    }
}

impl ManualClock {
    pub fn advance_seconds(&self, seconds: i64) {
        let mut now = self.now.lock().expect("clock lock");
        *now += TimeDelta::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Append-only OTP store over a `Vec`, with insertion-order ids.
#[derive(Default)]
pub struct InMemoryOtpStore {
    records: Mutex<Vec<OtpRecord>>,
    next_id: AtomicI64,
}

impl InMemoryOtpStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("otp lock").len()
    }

    /// Synchronous peek at the active record, for assertions.
    pub fn latest(&self, email: &str) -> Option<OtpRecord> {
        let records = self.records.lock().expect("otp lock");
        records
            .iter()
            .filter(|record| record.email == email)
            .max_by_key(|record| (record.created_at, record.id))
            .cloned()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn insert(
        &self,
        email: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord> {
        let record = OtpRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            code: code.to_string(),
            attempts: 0,
            created_at,
            expires_at,
        };
        self.records.lock().expect("otp lock").push(record.clone());
        Ok(record)
    }

    async fn latest_by_email(&self, email: &str) -> Result<Option<OtpRecord>> {
        Ok(self.latest(email))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.records
            .lock()
            .expect("otp lock")
            .retain(|record| record.id != id);
        Ok(())
    }

    async fn delete_expired(&self, email: &str, now: DateTime<Utc>) -> Result<u64> {
        let mut records = self.records.lock().expect("otp lock");
        let before = records.len();
        records.retain(|record| record.email != email || record.expires_at > now);
        Ok((before - records.len()) as u64)
    }

    async fn record_failed_attempt(&self, id: i64) -> Result<()> {
        let mut records = self.records.lock().expect("otp lock");
        if let Some(record) = records.iter_mut().find(|record| record.id == id) {
            record.attempts += 1;
        }
        Ok(())
    }
}

/// Staff accounts keyed by normalized email.
#[derive(Default)]
pub struct InMemoryStaffStore {
    accounts: Mutex<HashMap<String, StaffRecord>>,
}

impl InMemoryStaffStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_active(&self, email: &str, password: &str) -> Result<()> {
        self.add(email, password, StaffStatus::Active)
    }

    pub fn add_inactive(&self, email: &str, password: &str) -> Result<()> {
        self.add(email, password, StaffStatus::Inactive)
    }

    fn add(&self, email: &str, password: &str, status: StaffStatus) -> Result<()> {
        let email = email.trim().to_lowercase();
        let now = Utc::now();
        let record = StaffRecord {
            id: Uuid::new_v4(),
            name: "Test Person".to_string(),
            email: email.clone(),
            role: "staff".to_string(),
            status,
            password_hash: hash_password(password)?,
            created_at: now,
            updated_at: now,
        };
        self.accounts
            .lock()
            .expect("staff lock")
            .insert(email, record);
        Ok(())
    }

    pub fn password_hash(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .expect("staff lock")
            .get(email)
            .map(|record| record.password_hash.clone())
    }
}

#[async_trait]
impl StaffStore for InMemoryStaffStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StaffRecord>> {
        Ok(self
            .accounts
            .lock()
            .expect("staff lock")
            .get(email)
            .cloned())
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<u64> {
        let mut accounts = self.accounts.lock().expect("staff lock");
        match accounts.get_mut(email) {
            Some(record) => {
                record.password_hash = password_hash.to_string();
                record.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list(&self, filter: &StaffListFilter) -> Result<StaffPage> {
        let accounts = self.accounts.lock().expect("staff lock");
        let mut matched: Vec<&StaffRecord> = accounts
            .values()
            .filter(|record| {
                filter.status.is_none_or(|status| record.status == status)
                    && filter.search.as_deref().is_none_or(|needle| {
                        let needle = needle.to_lowercase();
                        record.name.to_lowercase().contains(&needle)
                            || record.email.contains(&needle)
                            || record.role.to_lowercase().contains(&needle)
                    })
            })
            .collect();
        matched.sort_by(|a, b| {
            let ordering = match filter.order {
                StaffOrder::CreatedAt => a.created_at.cmp(&b.created_at),
                StaffOrder::Name => a.name.cmp(&b.name),
                StaffOrder::Email => a.email.cmp(&b.email),
            };
            if filter.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let count = matched.len() as i64;
        let data = matched
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(0))
            .take(usize::try_from(filter.limit).unwrap_or(0))
            .map(|record| StaffSummary {
                id: record.id.to_string(),
                name: record.name.clone(),
                email: record.email.clone(),
                role: record.role.clone(),
                status: record.status.as_str().to_string(),
                created_at: record.created_at.to_rfc3339(),
            })
            .collect();
        Ok(StaffPage { count, data })
    }
}

struct StoredToken {
    email: String,
    token_hash: Vec<u8>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

/// Reset tokens over a `Vec`, mirroring the SQL consume semantics.
#[derive(Default)]
pub struct InMemoryResetTokenStore {
    tokens: Mutex<Vec<StoredToken>>,
}

impl InMemoryResetTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResetTokenStore for InMemoryResetTokenStore {
    async fn insert(
        &self,
        email: &str,
        token_hash: &[u8],
        _created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.tokens.lock().expect("token lock").push(StoredToken {
            email: email.to_string(),
            token_hash: token_hash.to_vec(),
            expires_at,
            used_at: None,
        });
        Ok(())
    }

    async fn invalidate_outstanding(&self, email: &str, now: DateTime<Utc>) -> Result<u64> {
        let mut tokens = self.tokens.lock().expect("token lock");
        let mut invalidated = 0;
        for token in tokens
            .iter_mut()
            .filter(|token| token.email == email && token.used_at.is_none())
        {
            token.used_at = Some(now);
            invalidated += 1;
        }
        Ok(invalidated)
    }

    async fn consume(&self, email: &str, token_hash: &[u8], now: DateTime<Utc>) -> Result<bool> {
        let mut tokens = self.tokens.lock().expect("token lock");
        let found = tokens.iter_mut().find(|token| {
            token.email == email
                && token.token_hash == token_hash
                && token.used_at.is_none()
                && token.expires_at > now
        });
        match found {
            Some(token) => {
                token.used_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Records every message; can be told to fail the next send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_next: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock").clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("simulated smtp failure"));
        }
        self.sent.lock().expect("mailer lock").push(email.clone());
        Ok(())
    }
}

/// A recovery service over fresh in-memory doubles, for handler tests that
/// never reach the template or transport layers.
#[must_use]
pub fn recovery_service() -> std::sync::Arc<crate::recovery::RecoveryService> {
    use crate::recovery::{RecoveryConfig, RecoveryService};
    std::sync::Arc::new(RecoveryService::new(
        std::sync::Arc::new(InMemoryStaffStore::new()),
        std::sync::Arc::new(InMemoryOtpStore::new()),
        std::sync::Arc::new(InMemoryResetTokenStore::new()),
        std::sync::Arc::new(RecordingMailer::default()),
        std::sync::Arc::new(ManualClock::default()),
        RecoveryConfig::new(),
    ))
}

/// Write the branded templates into a scratch directory and return it.
pub fn write_test_templates() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("rollcall-templates-{}", ulid::Ulid::new()));
    std::fs::create_dir_all(&dir)?;
    std::fs::write(
        dir.join("forgot_password.html"),
        "<html><body><p>{{brandName}} code for {{email}}: {{otp}}</p>\
         <p><a href=\"{{loginUrl}}\">Sign in</a> or contact {{supportEmail}}</p></body></html>",
    )?;
    std::fs::write(
        dir.join("welcome.html"),
        "<html><body><p>Welcome to {{brandName}}, {{name}}!</p>\
         <p>Account: {{email}} / {{password}}</p>\
         <p><a href=\"{{loginUrl}}\">Sign in</a></p></body></html>",
    )?;
    Ok(dir)
}
