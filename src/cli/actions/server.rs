use crate::api;
use crate::cli::commands::{app, smtp};
use crate::mail::{LogMailer, MailSender, SmtpMailer};
use crate::recovery::RecoveryConfig;
use anyhow::{Result, anyhow};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub smtp: smtp::Options,
    pub app: app::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the mail transport cannot be built or the server
/// fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mailer: Arc<dyn MailSender> = match &args.smtp.host {
        Some(host) => {
            let sender = args
                .smtp
                .sender()
                .ok_or_else(|| anyhow!("A sender address is required for SMTP delivery"))?;
            info!(host, "using SMTP mail delivery");
            Arc::new(SmtpMailer::new(
                host,
                args.smtp.port,
                args.smtp.secure,
                args.smtp.user.as_deref(),
                args.smtp.pass.as_ref(),
                sender,
            )?)
        }
        None => {
            warn!("no SMTP host configured; outbound mail will only be logged");
            Arc::new(LogMailer)
        }
    };

    let config = RecoveryConfig::new()
        .with_brand_name(args.app.brand_name)
        .with_login_url(args.app.login_url)
        .with_custom_url(args.app.custom_url)
        .with_support_email(args.app.support_email)
        .with_templates_dir(args.app.templates_dir);

    api::new(args.port, args.dsn, mailer, config).await
}
