//! Template rendering and inline-branding assets.
//!
//! Templates are plain HTML files with `{{key}}` placeholders bound from a
//! JSON map; rendering is a pure substitution with no logic. The optional
//! logo is probed from a fixed, ordered list of candidate file names under
//! the template assets directory. The first hit is attached inline under
//! [`LOGO_CID`], and the template references it as `cid:` + that value.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Content-id shared between the attachment and the `<img>` tag.
pub const LOGO_CID: &str = "brand-logo";

/// Recovery-code message template file name.
pub const FORGOT_PASSWORD_TEMPLATE: &str = "forgot_password.html";

/// Onboarding message template file name.
pub const WELCOME_TEMPLATE: &str = "welcome.html";

/// Probe order for the inline logo under `<templates>/assets/`.
const LOGO_CANDIDATES: &[&str] = &["logo.webp", "logo.png", "logo.jpg", "logo.jpeg"];

/// Bind a data map into a template. Every `{{key}}` occurrence is replaced
/// with the value's text; placeholders without a matching key are left
/// untouched.
#[must_use]
pub fn render(template: &str, data: &Map<String, Value>) -> String {
    let mut body = template.to_string();
    for (key, value) in data {
        let placeholder = format!("{{{{{key}}}}}");
        let text = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        body = body.replace(&placeholder, &text);
    }
    body
}

/// Read a named template from the templates directory.
///
/// # Errors
/// Returns an error if the file is missing or unreadable.
pub fn load(templates_dir: &Path, name: &str) -> Result<String> {
    let path = templates_dir.join(name);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read template {}", path.display()))
}

/// First existing logo candidate under `<templates>/assets/`, if any.
/// Absence is not an error; mail goes out without inline branding.
#[must_use]
pub fn resolve_logo(templates_dir: &Path) -> Option<PathBuf> {
    let assets = templates_dir.join("assets");
    LOGO_CANDIDATES
        .iter()
        .map(|name| assets.join(name))
        .find(|path| path.is_file())
}

/// MIME type for a logo file, keyed off its extension.
#[must_use]
pub fn logo_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("webp") => "image/webp",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "image/png",
    }
}
