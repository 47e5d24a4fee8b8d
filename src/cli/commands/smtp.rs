//! Mail gateway arguments. Without `--smtp-host` the server logs outbound
//! mail instead of delivering it.

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SMTP_HOST: &str = "smtp-host";
pub const ARG_SMTP_PORT: &str = "smtp-port";
pub const ARG_SMTP_SECURE: &str = "smtp-secure";
pub const ARG_SMTP_USER: &str = "smtp-user";
pub const ARG_SMTP_PASS: &str = "smtp-pass";
pub const ARG_MAIL_FROM: &str = "mail-from";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SMTP_HOST)
                .long(ARG_SMTP_HOST)
                .help("SMTP relay host; omit to log mail instead of sending")
                .env("ROLLCALL_SMTP_HOST"),
        )
        .arg(
            Arg::new(ARG_SMTP_PORT)
                .long(ARG_SMTP_PORT)
                .help("SMTP relay port")
                .env("ROLLCALL_SMTP_PORT")
                .default_value("465")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_SMTP_SECURE)
                .long(ARG_SMTP_SECURE)
                .help("Use implicit TLS (SMTPS); disable for STARTTLS")
                .env("ROLLCALL_SMTP_SECURE")
                .default_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new(ARG_SMTP_USER)
                .long(ARG_SMTP_USER)
                .help("SMTP username; doubles as the sender when --mail-from is unset")
                .env("ROLLCALL_SMTP_USER"),
        )
        .arg(
            Arg::new(ARG_SMTP_PASS)
                .long(ARG_SMTP_PASS)
                .help("SMTP password")
                .env("ROLLCALL_SMTP_PASS"),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("Sender address for outbound mail")
                .env("ROLLCALL_MAIL_FROM"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub host: Option<String>,
    pub port: u16,
    pub secure: bool,
    pub user: Option<String>,
    pub pass: Option<SecretString>,
    pub mail_from: Option<String>,
}

impl Options {
    /// Extract the mail gateway options from parsed matches.
    ///
    /// # Errors
    /// Currently infallible; kept fallible to match the other option blocks.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            host: matches.get_one::<String>(ARG_SMTP_HOST).cloned(),
            port: matches
                .get_one::<u16>(ARG_SMTP_PORT)
                .copied()
                .unwrap_or(465),
            secure: matches
                .get_one::<bool>(ARG_SMTP_SECURE)
                .copied()
                .unwrap_or(true),
            user: matches.get_one::<String>(ARG_SMTP_USER).cloned(),
            pass: matches
                .get_one::<String>(ARG_SMTP_PASS)
                .cloned()
                .map(SecretString::from),
            mail_from: matches.get_one::<String>(ARG_MAIL_FROM).cloned(),
        })
    }

    /// Sender address: explicit `--mail-from`, else the SMTP username.
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.mail_from.as_deref().or(self.user.as_deref())
    }
}
