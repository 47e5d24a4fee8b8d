use anyhow::Result;
use chrono::TimeDelta;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;

use super::models::{OtpRecord, VerifyOutcome};
use super::store::OtpStore;

/// Codes live for exactly one minute from issuance.
pub const OTP_TTL_SECONDS: i64 = 60;

/// Failed attempts tolerated per record before it is frozen.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Issues, expires, and verifies one-time passwords.
///
/// Holds no state of its own; every operation is a read-modify-write
/// against the injected store, timed by the injected clock.
#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    clock: Arc<dyn Clock>,
}

impl OtpService {
    #[must_use]
    pub fn new(store: Arc<dyn OtpStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// A 6-digit numeric code. Always handled as a fixed-width string so
    /// comparison never goes through an integer parse.
    #[must_use]
    pub fn generate() -> String {
        rand::thread_rng().gen_range(100_000..1_000_000).to_string()
    }

    /// Create and persist a fresh code for the email.
    ///
    /// Outstanding records for the same email are left alone: several
    /// valid-looking rows may coexist, and verification resolves the
    /// newest. Rows already past their deadline are swept on the way in.
    ///
    /// # Errors
    /// Returns an error if the store insert fails.
    pub async fn issue(&self, email: &str) -> Result<OtpRecord> {
        let now = self.clock.now();
        let swept = self.store.delete_expired(email, now).await?;
        if swept > 0 {
            debug!(email, swept, "swept expired otp records before issue");
        }

        let code = Self::generate();
        let expires_at = now + TimeDelta::seconds(OTP_TTL_SECONDS);
        self.store.insert(email, &code, now, expires_at).await
    }

    /// Check a submitted code against the active record for the email.
    ///
    /// A match consumes the record (single use). A mismatch leaves it in
    /// place but counts against [`MAX_FAILED_ATTEMPTS`]; once the budget is
    /// spent the record is frozen until it expires. An expired active
    /// record is deleted on sight, together with any older expired rows.
    ///
    /// # Errors
    /// Returns an error if a store operation fails.
    pub async fn verify(&self, email: &str, submitted: &str) -> Result<VerifyOutcome> {
        let Some(record) = self.store.latest_by_email(email).await? else {
            return Ok(VerifyOutcome::NotFound);
        };

        let now = self.clock.now();
        if record.is_expired(now) {
            self.store.delete_expired(email, now).await?;
            return Ok(VerifyOutcome::Expired);
        }

        if record.attempts >= MAX_FAILED_ATTEMPTS {
            return Ok(VerifyOutcome::Locked);
        }

        if record.code != submitted {
            self.store.record_failed_attempt(record.id).await?;
            return Ok(VerifyOutcome::InvalidCode);
        }

        self.store.delete(record.id).await?;
        Ok(VerifyOutcome::Verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{InMemoryOtpStore, ManualClock};

    fn service() -> (OtpService, Arc<InMemoryOtpStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryOtpStore::new());
        let clock = Arc::new(ManualClock::default());
        let service = OtpService::new(store.clone(), clock.clone());
        (service, store, clock)
    }

    #[test]
    fn generated_codes_are_six_digit_strings() {
        for _ in 0..1_000 {
            let code = OtpService::generate();
            assert_eq!(code.len(), 6, "code {code} is not six characters");
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn issue_then_verify_consumes_the_record() -> Result<()> {
        let (service, store, _clock) = service();

        let record = service.issue("user@example.com").await?;
        assert_eq!(
            record.expires_at - record.created_at,
            TimeDelta::seconds(OTP_TTL_SECONDS)
        );

        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::Verified);
        assert_eq!(store.len(), 0);

        // Single use: the same code no longer matches anything.
        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn expired_record_is_lazily_deleted() -> Result<()> {
        let (service, store, clock) = service();

        let record = service.issue("user@example.com").await?;
        clock.advance_seconds(OTP_TTL_SECONDS);

        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::Expired);
        assert_eq!(store.len(), 0);

        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn verify_within_window_succeeds() -> Result<()> {
        let (service, _store, clock) = service();

        let record = service.issue("user@example.com").await?;
        clock.advance_seconds(30);

        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::Verified);
        Ok(())
    }

    #[tokio::test]
    async fn latest_record_wins_over_earlier_ones() -> Result<()> {
        let (service, store, _clock) = service();

        let first = service.issue("user@example.com").await?;
        let second = service.issue("user@example.com").await?;
        assert_eq!(store.len(), 2);

        // The earlier code is permanently unverifiable once a later record
        // exists, even though its row is still present.
        if first.code != second.code {
            let outcome = service.verify("user@example.com", &first.code).await?;
            assert_eq!(outcome, VerifyOutcome::InvalidCode);
        }

        let outcome = service.verify("user@example.com", &second.code).await?;
        assert_eq!(outcome, VerifyOutcome::Verified);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_code_keeps_record_for_retry() -> Result<()> {
        let (service, store, _clock) = service();

        let record = service.issue("user@example.com").await?;
        let wrong = if record.code == "000000" { "111111" } else { "000000" };

        let outcome = service.verify("user@example.com", wrong).await?;
        assert_eq!(outcome, VerifyOutcome::InvalidCode);
        assert_eq!(store.len(), 1);

        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::Verified);
        Ok(())
    }

    #[tokio::test]
    async fn attempt_budget_freezes_the_record() -> Result<()> {
        let (service, _store, _clock) = service();

        let record = service.issue("user@example.com").await?;
        let wrong = if record.code == "000000" { "111111" } else { "000000" };

        for _ in 0..MAX_FAILED_ATTEMPTS {
            let outcome = service.verify("user@example.com", wrong).await?;
            assert_eq!(outcome, VerifyOutcome::InvalidCode);
        }

        // Even the correct code is refused once the budget is spent.
        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::Locked);
        Ok(())
    }

    #[tokio::test]
    async fn locked_record_still_expires() -> Result<()> {
        let (service, store, clock) = service();

        let record = service.issue("user@example.com").await?;
        let wrong = if record.code == "000000" { "111111" } else { "000000" };
        for _ in 0..MAX_FAILED_ATTEMPTS {
            service.verify("user@example.com", wrong).await?;
        }

        clock.advance_seconds(OTP_TTL_SECONDS + 1);
        let outcome = service.verify("user@example.com", &record.code).await?;
        assert_eq!(outcome, VerifyOutcome::Expired);
        assert_eq!(store.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn issue_sweeps_expired_rows() -> Result<()> {
        let (service, store, clock) = service();

        service.issue("user@example.com").await?;
        clock.advance_seconds(OTP_TTL_SECONDS + 1);

        service.issue("user@example.com").await?;
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
