//! The recovery orchestrator.
//!
//! Sequences account checks, OTP issuance, templated mail composition and
//! dispatch, verification, reset-token grants, and credential updates. All
//! collaborators arrive through the constructor, so the whole flow runs
//! against in-memory doubles in tests.
//!
//! Issuance and dispatch are two independent effects with no compensating
//! action: a failed send leaves a valid, never-delivered record behind,
//! which simply expires unused.

use anyhow::Context;
use chrono::TimeDelta;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::fs;
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;
use crate::mail::template::{
    FORGOT_PASSWORD_TEMPLATE, LOGO_CID, WELCOME_TEMPLATE, logo_content_type, render, resolve_logo,
};
use crate::mail::{InlineAttachment, MailSender, OutgoingEmail};
use crate::otp::{OtpService, OtpStore, VerifyOutcome};
use crate::staff::password::{hash_password, verify_password};
use crate::staff::store::StaffStore;

use super::config::RecoveryConfig;
use super::error::RecoveryError;
use super::tokens::{
    RESET_TOKEN_SKEW_SECONDS, RESET_TOKEN_TTL_SECONDS, ResetTokenStore, generate_reset_token,
    hash_reset_token,
};

/// Minimum accepted credential length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw reset token handed to the caller after a successful verification.
#[derive(Debug, Clone)]
pub struct ResetGrant {
    pub token: String,
    pub expires_in_seconds: i64,
}

/// Normalize an email for lookups and store keys.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

pub struct RecoveryService {
    staff: Arc<dyn StaffStore>,
    otp: OtpService,
    tokens: Arc<dyn ResetTokenStore>,
    mailer: Arc<dyn MailSender>,
    clock: Arc<dyn Clock>,
    config: RecoveryConfig,
}

impl RecoveryService {
    #[must_use]
    pub fn new(
        staff: Arc<dyn StaffStore>,
        otp_store: Arc<dyn OtpStore>,
        tokens: Arc<dyn ResetTokenStore>,
        mailer: Arc<dyn MailSender>,
        clock: Arc<dyn Clock>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            staff,
            otp: OtpService::new(otp_store, clock.clone()),
            tokens,
            mailer,
            clock,
            config,
        }
    }

    /// The staff store, for the read-only directory surface.
    #[must_use]
    pub fn staff(&self) -> &Arc<dyn StaffStore> {
        &self.staff
    }

    /// Gated issuance: only active accounts receive a code.
    ///
    /// Callers at the HTTP boundary must not reflect [`RecoveryError::NotRegistered`]
    /// back to the requester; the existence check is internal branching only.
    ///
    /// # Errors
    /// `NotRegistered` when no active account matches; `Store`/`Send`/`Internal`
    /// for infrastructure failures. A send failure does not roll back the
    /// already-inserted record.
    pub async fn request_otp(&self, email: &str) -> Result<(), RecoveryError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(RecoveryError::Validation("Email is required.".to_string()));
        }

        let account = self
            .staff
            .find_by_email(&email)
            .await
            .map_err(RecoveryError::Store)?;
        let Some(account) = account else {
            return Err(RecoveryError::NotRegistered);
        };
        if !account.is_active() {
            return Err(RecoveryError::NotRegistered);
        }

        let record = self.otp.issue(&email).await.map_err(RecoveryError::Store)?;

        let data = self.template_data(json!({
            "email": email,
            "otp": record.code,
        }));
        let message = self.compose_branded(
            &email,
            &format!("Your {} password reset code", self.config.brand_name()),
            FORGOT_PASSWORD_TEMPLATE,
            &data,
        )?;

        self.mailer
            .send(&message)
            .await
            .map_err(RecoveryError::Send)?;
        debug!(email, "recovery code dispatched");
        Ok(())
    }

    /// Ungated issuance: no account check, a plain unbranded message.
    ///
    /// # Errors
    /// `Validation` on a missing/garbled address; `Store`/`Send` otherwise.
    pub async fn resend_otp(&self, email: &str) -> Result<(), RecoveryError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(RecoveryError::Validation("Email is required.".to_string()));
        }
        if !valid_email(&email) {
            return Err(RecoveryError::Validation(
                "A valid email is required.".to_string(),
            ));
        }

        let record = self.otp.issue(&email).await.map_err(RecoveryError::Store)?;

        let message = OutgoingEmail {
            to: email.clone(),
            subject: format!("Your {} password reset code", self.config.brand_name()),
            html_body: format!(
                "<div style=\"font-family:Arial,Helvetica,sans-serif;font-size:14px;line-height:1.6\">\
                 <h2>Your one-time password</h2>\
                 <p>Use this code. It expires in <b>1 minute</b>.</p>\
                 <p style=\"font-size:24px;font-weight:bold;letter-spacing:3px\">{}</p>\
                 <p>If you didn't request this, you can ignore this email.</p>\
                 </div>",
                record.code
            ),
            attachments: Vec::new(),
        };

        self.mailer
            .send(&message)
            .await
            .map_err(RecoveryError::Send)?;
        Ok(())
    }

    /// Check a submitted code; on success, consume it and mint a single-use
    /// reset token bound to the email.
    ///
    /// # Errors
    /// `OtpNotFound`/`OtpExpired`/`OtpInvalid`/`OtpLocked` map the
    /// verification outcomes; `Store`/`Internal` for infrastructure.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<ResetGrant, RecoveryError> {
        let email = normalize_email(email);
        let code = code.trim();
        if email.is_empty() || code.is_empty() {
            return Err(RecoveryError::Validation(
                "Email and code are required.".to_string(),
            ));
        }

        let outcome = self
            .otp
            .verify(&email, code)
            .await
            .map_err(RecoveryError::Store)?;
        match outcome {
            VerifyOutcome::Verified => {}
            VerifyOutcome::NotFound => return Err(RecoveryError::OtpNotFound),
            VerifyOutcome::Expired => return Err(RecoveryError::OtpExpired),
            VerifyOutcome::InvalidCode => return Err(RecoveryError::OtpInvalid),
            VerifyOutcome::Locked => return Err(RecoveryError::OtpLocked),
        }

        let now = self.clock.now();
        self.tokens
            .invalidate_outstanding(&email, now)
            .await
            .map_err(RecoveryError::Store)?;

        let token = generate_reset_token().map_err(RecoveryError::Internal)?;
        let token_hash = hash_reset_token(&token);
        let expires_at = now + TimeDelta::seconds(RESET_TOKEN_TTL_SECONDS);
        self.tokens
            .insert(&email, &token_hash, now, expires_at)
            .await
            .map_err(RecoveryError::Store)?;

        Ok(ResetGrant {
            token,
            expires_in_seconds: RESET_TOKEN_TTL_SECONDS,
        })
    }

    /// Overwrite the credential after a valid reset-token presentation.
    ///
    /// # Errors
    /// `Validation` on missing fields, mismatched confirmation, or a short
    /// password; `ResetTokenInvalid` when no live token matches.
    pub async fn reset_password(
        &self,
        email: &str,
        reset_token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), RecoveryError> {
        let email = normalize_email(email);
        let reset_token = reset_token.trim();
        let password = password.trim();
        let confirm_password = confirm_password.trim();

        if email.is_empty() || reset_token.is_empty() || password.is_empty() {
            return Err(RecoveryError::Validation(
                "Email, reset token, password, and confirm password are required.".to_string(),
            ));
        }
        if password != confirm_password {
            return Err(RecoveryError::Validation(
                "Passwords do not match.".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RecoveryError::Validation(
                "Password must be at least 8 characters.".to_string(),
            ));
        }

        // Small grace window so a token minted against a slightly-fast
        // clock is not rejected at the boundary of its TTL.
        let cutoff = self.clock.now() - TimeDelta::seconds(RESET_TOKEN_SKEW_SECONDS);
        let consumed = self
            .tokens
            .consume(&email, &hash_reset_token(reset_token), cutoff)
            .await
            .map_err(RecoveryError::Store)?;
        if !consumed {
            return Err(RecoveryError::ResetTokenInvalid);
        }

        let password_hash = hash_password(password).map_err(RecoveryError::Internal)?;
        self.staff
            .update_password_hash(&email, &password_hash)
            .await
            .map_err(RecoveryError::Store)?;
        Ok(())
    }

    /// Authenticated credential change: the current value must verify
    /// against the stored hash before the overwrite.
    ///
    /// # Errors
    /// `Validation` on malformed input or a wrong current password;
    /// `NotRegistered` when the email matches no account.
    pub async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), RecoveryError> {
        let email = normalize_email(email);
        let current_password = current_password.trim();
        let new_password = new_password.trim();
        let confirm_password = confirm_password.trim();

        if email.is_empty() || current_password.is_empty() || new_password.is_empty() {
            return Err(RecoveryError::Validation(
                "All fields are required (email, current, new, confirm).".to_string(),
            ));
        }
        if new_password != confirm_password {
            return Err(RecoveryError::Validation(
                "New passwords do not match.".to_string(),
            ));
        }
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RecoveryError::Validation(
                "Password must be at least 8 characters long.".to_string(),
            ));
        }

        let account = self
            .staff
            .find_by_email(&email)
            .await
            .map_err(RecoveryError::Store)?
            .ok_or(RecoveryError::NotRegistered)?;

        if !verify_password(current_password, &account.password_hash) {
            return Err(RecoveryError::Validation(
                "Current password is incorrect.".to_string(),
            ));
        }

        let password_hash = hash_password(new_password).map_err(RecoveryError::Internal)?;
        self.staff
            .update_password_hash(&email, &password_hash)
            .await
            .map_err(RecoveryError::Store)?;
        Ok(())
    }

    /// Onboarding mail with the branded template and inline logo.
    ///
    /// # Errors
    /// `Validation` on missing fields; `Send`/`Internal` otherwise.
    pub async fn send_welcome_email(
        &self,
        to: &str,
        name: &str,
        temporary_password: &str,
    ) -> Result<(), RecoveryError> {
        let to = normalize_email(to);
        let name = name.trim();
        if to.is_empty() || name.is_empty() || temporary_password.is_empty() {
            return Err(RecoveryError::Validation(
                "Recipient, name, and temporary password are required.".to_string(),
            ));
        }

        let data = self.template_data(json!({
            "name": name,
            "email": to,
            "password": temporary_password,
        }));
        let message = self.compose_branded(
            &to,
            &format!("Welcome to {}", self.config.brand_name()),
            WELCOME_TEMPLATE,
            &data,
        )?;

        self.mailer
            .send(&message)
            .await
            .map_err(RecoveryError::Send)?;
        Ok(())
    }

    /// Merge message-specific values with the shared branding bindings.
    fn template_data(&self, extra: Value) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("brandName".to_string(), json!(self.config.brand_name()));
        data.insert("loginUrl".to_string(), json!(self.config.login_url()));
        data.insert(
            "supportEmail".to_string(),
            json!(self.config.support_email()),
        );
        data.insert("customUrl".to_string(), json!(self.config.custom_url()));
        if let Value::Object(extra) = extra {
            data.extend(extra);
        }
        data
    }

    /// Load and bind a named template, then attach the inline logo if one
    /// of the candidate files exists.
    fn compose_branded(
        &self,
        to: &str,
        subject: &str,
        template_name: &str,
        data: &Map<String, Value>,
    ) -> Result<OutgoingEmail, RecoveryError> {
        let template = crate::mail::template::load(self.config.templates_dir(), template_name)
            .map_err(RecoveryError::Internal)?;
        let html_body = render(&template, data);

        let mut attachments = Vec::new();
        if let Some(path) = resolve_logo(self.config.templates_dir()) {
            let content = fs::read(&path)
                .with_context(|| format!("failed to read logo asset {}", path.display()))
                .map_err(RecoveryError::Internal)?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "logo".to_string());
            attachments.push(InlineAttachment {
                filename,
                content,
                content_type: logo_content_type(&path).to_string(),
                content_id: LOGO_CID.to_string(),
            });
        }

        Ok(OutgoingEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body,
            attachments,
        })
    }
}
