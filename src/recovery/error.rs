//! Domain failure taxonomy and its single HTTP translation point.
//!
//! Core functions return these typed errors; the handlers convert each one
//! to a status plus JSON body exactly once. Infrastructure failures keep
//! their full error chain for the server-side log but leak only a generic
//! message to the caller.

use axum::http::StatusCode;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Client hint: the sensible next step is to request a fresh code.
pub const ACTION_REQUEST_OTP: &str = "request_otp";

#[derive(Debug)]
pub enum RecoveryError {
    /// Malformed/missing input, mismatched confirmation, short credential.
    Validation(String),
    /// No matching active account for a gated operation.
    NotRegistered,
    /// No OTP record exists for the email.
    OtpNotFound,
    /// The active OTP record is past its TTL.
    OtpExpired,
    /// Submitted code does not match the active record.
    OtpInvalid,
    /// Too many failed attempts against the active record.
    OtpLocked,
    /// Reset token missing, already used, expired, or not for this email.
    ResetTokenInvalid,
    /// A store operation failed.
    Store(anyhow::Error),
    /// Mail dispatch failed.
    Send(anyhow::Error),
    /// Anything else unexpected (template load, rendering, hashing).
    Internal(anyhow::Error),
}

impl RecoveryError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::OtpInvalid | Self::ResetTokenInvalid => {
                StatusCode::BAD_REQUEST
            }
            Self::NotRegistered | Self::OtpNotFound => StatusCode::NOT_FOUND,
            Self::OtpExpired => StatusCode::GONE,
            Self::OtpLocked => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(_) | Self::Send(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Optional `action` hint carried in the error body.
    #[must_use]
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Self::OtpNotFound | Self::OtpExpired | Self::OtpInvalid | Self::OtpLocked => {
                Some(ACTION_REQUEST_OTP)
            }
            _ => None,
        }
    }

    /// Message safe to return to the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotRegistered => {
                "This email isn't registered or is inactive. Please contact support.".to_string()
            }
            Self::OtpNotFound => {
                "No code found for this email. Please request a new one.".to_string()
            }
            Self::OtpExpired => "Code expired. Please request a new one.".to_string(),
            Self::OtpInvalid => {
                "Invalid code. Please check it or request a new one.".to_string()
            }
            Self::OtpLocked => {
                "Too many failed attempts. Please request a new code.".to_string()
            }
            Self::ResetTokenInvalid => "Invalid or expired reset token.".to_string(),
            Self::Store(_) | Self::Send(_) | Self::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.public_message(),
            action: self.action().map(str::to_string),
        }
    }
}

impl fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotRegistered => write!(f, "no matching active account"),
            Self::OtpNotFound => write!(f, "no otp record"),
            Self::OtpExpired => write!(f, "otp expired"),
            Self::OtpInvalid => write!(f, "otp mismatch"),
            Self::OtpLocked => write!(f, "otp locked after repeated failures"),
            Self::ResetTokenInvalid => write!(f, "reset token invalid"),
            Self::Store(err) => write!(f, "store failure: {err:#}"),
            Self::Send(err) => write!(f, "send failure: {err:#}"),
            Self::Internal(err) => write!(f, "internal failure: {err:#}"),
        }
    }
}

impl std::error::Error for RecoveryError {}

/// JSON error envelope: `{error, action?}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}
