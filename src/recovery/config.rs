//! Branding and template configuration for outbound recovery mail.

use std::path::{Path, PathBuf};

const DEFAULT_BRAND_NAME: &str = "Rollcall";
const DEFAULT_LOGIN_URL: &str = "https://staff.rollcall.dev/login";
const DEFAULT_SUPPORT_EMAIL: &str = "support@rollcall.dev";
const DEFAULT_TEMPLATES_DIR: &str = "templates";

#[derive(Clone, Debug)]
pub struct RecoveryConfig {
    brand_name: String,
    login_url: String,
    custom_url: String,
    support_email: String,
    templates_dir: PathBuf,
}

impl RecoveryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            custom_url: String::new(),
            support_email: DEFAULT_SUPPORT_EMAIL.to_string(),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
        }
    }

    #[must_use]
    pub fn with_brand_name(mut self, brand_name: String) -> Self {
        self.brand_name = brand_name;
        self
    }

    #[must_use]
    pub fn with_login_url(mut self, login_url: String) -> Self {
        self.login_url = login_url;
        self
    }

    #[must_use]
    pub fn with_custom_url(mut self, custom_url: String) -> Self {
        self.custom_url = custom_url;
        self
    }

    #[must_use]
    pub fn with_support_email(mut self, support_email: String) -> Self {
        self.support_email = support_email;
        self
    }

    #[must_use]
    pub fn with_templates_dir(mut self, templates_dir: PathBuf) -> Self {
        self.templates_dir = templates_dir;
        self
    }

    #[must_use]
    pub fn brand_name(&self) -> &str {
        &self.brand_name
    }

    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    #[must_use]
    pub fn custom_url(&self) -> &str {
        &self.custom_url
    }

    #[must_use]
    pub fn support_email(&self) -> &str {
        &self.support_email
    }

    #[must_use]
    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::new()
    }
}
