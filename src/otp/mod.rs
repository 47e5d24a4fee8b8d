//! One-time password lifecycle: generation, storage, expiry, verification.

pub mod models;
pub mod service;
pub mod store;

pub use models::{OtpRecord, VerifyOutcome};
pub use service::OtpService;
pub use store::{OtpStore, PgOtpStore};
