//! # Rollcall (Staff Directory & Account Recovery)
//!
//! `rollcall` is the staff directory backend: account listing plus an
//! OTP-based recovery and credential-update flow.
//!
//! ## Recovery flow
//!
//! A requester asks for a code by email. If the address maps to an active
//! account, a 6-digit code is stored with a 60-second deadline and mailed
//! out through a branded template; the HTTP acknowledgement is identical
//! either way, so responses cannot be used to probe which emails exist.
//! Several codes may be outstanding for one address; only the newest one
//! verifies.
//!
//! Verification consumes the code (single use) and mints a short-lived,
//! single-use reset token; only its hash is stored. The reset call must
//! present that token alongside the new credential. Credentials are kept
//! as Argon2 PHC strings and checked with the library verifier.
//!
//! ## Failure semantics
//!
//! Code issuance and mail dispatch are two independent effects with no
//! transaction between them: a failed send leaves a valid, undelivered
//! record that expires on its own. Nothing in the core retries; store and
//! mail failures surface to the caller immediately.

pub mod api;
pub mod cli;
pub mod clock;
pub mod mail;
pub mod otp;
pub mod recovery;
pub mod staff;

#[cfg(test)]
pub(crate) mod testkit;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
