//! Branding and template arguments for outbound mail and CORS.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_BRAND_NAME: &str = "brand-name";
pub const ARG_LOGIN_URL: &str = "login-url";
pub const ARG_CUSTOM_URL: &str = "custom-url";
pub const ARG_SUPPORT_EMAIL: &str = "support-email";
pub const ARG_TEMPLATES_DIR: &str = "templates-dir";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BRAND_NAME)
                .long(ARG_BRAND_NAME)
                .help("Brand name bound into mail templates")
                .env("ROLLCALL_BRAND_NAME")
                .default_value("Rollcall"),
        )
        .arg(
            Arg::new(ARG_LOGIN_URL)
                .long(ARG_LOGIN_URL)
                .help("Admin frontend login URL; its origin is also the CORS allow-origin")
                .env("ROLLCALL_LOGIN_URL")
                .default_value("https://staff.rollcall.dev/login"),
        )
        .arg(
            Arg::new(ARG_CUSTOM_URL)
                .long(ARG_CUSTOM_URL)
                .help("Optional extra URL bound into mail templates")
                .env("ROLLCALL_CUSTOM_URL"),
        )
        .arg(
            Arg::new(ARG_SUPPORT_EMAIL)
                .long(ARG_SUPPORT_EMAIL)
                .help("Support contact shown in outbound mail")
                .env("ROLLCALL_SUPPORT_EMAIL")
                .default_value("support@rollcall.dev"),
        )
        .arg(
            Arg::new(ARG_TEMPLATES_DIR)
                .long(ARG_TEMPLATES_DIR)
                .help("Directory with mail templates and the assets/ logo candidates")
                .env("ROLLCALL_TEMPLATES_DIR")
                .default_value("templates"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub brand_name: String,
    pub login_url: String,
    pub custom_url: String,
    pub support_email: String,
    pub templates_dir: PathBuf,
}

impl Options {
    /// Extract the branding options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow absent.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            brand_name: matches
                .get_one::<String>(ARG_BRAND_NAME)
                .cloned()
                .context("missing required argument: --brand-name")?,
            login_url: matches
                .get_one::<String>(ARG_LOGIN_URL)
                .cloned()
                .context("missing required argument: --login-url")?,
            custom_url: matches
                .get_one::<String>(ARG_CUSTOM_URL)
                .cloned()
                .unwrap_or_default(),
            support_email: matches
                .get_one::<String>(ARG_SUPPORT_EMAIL)
                .cloned()
                .context("missing required argument: --support-email")?,
            templates_dir: matches
                .get_one::<String>(ARG_TEMPLATES_DIR)
                .map(PathBuf::from)
                .context("missing required argument: --templates-dir")?,
        })
    }
}
