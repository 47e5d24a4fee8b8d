//! Account recovery: OTP issuance and delivery, verification, reset-token
//! grants, and credential updates.

pub mod config;
pub mod error;
pub mod service;
pub mod tokens;

pub use config::RecoveryConfig;
pub use error::RecoveryError;
pub use service::{RecoveryService, ResetGrant};
pub use tokens::{PgResetTokenStore, ResetTokenStore};
