//! Configuration loader and credential resolution for the daily report job.
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the SMTP account name (also the From
/// address).
pub const SMTP_USER_ENV: &str = "GMAIL_USER";
/// Environment variable holding the SMTP password or app password.
pub const SMTP_PASS_ENV: &str = "GMAIL_PASS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("Missing credential: set the {0} environment variable (or put it in .env for local runs)")]
    MissingCredential(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub report: Report,
    pub feed: Feed,
    pub mail: Mail,
}

/// Report title, reference timezone, and attachment naming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    /// IANA zone the business day is evaluated in, regardless of where the
    /// process runs.
    pub timezone: Tz,
    pub attachment_name: String,
}

/// Upstream feed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feed {
    pub url: String,
    pub timeout_seconds: u64,
}

/// Outbound mail settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mail {
    pub smtp_host: String,
    pub recipients: Vec<String>,
    /// When set, reports go to `test_recipients` instead of the real list.
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub test_recipients: Vec<String>,
}

impl Mail {
    /// The recipient list this run should actually deliver to.
    pub fn effective_recipients(&self) -> &[String] {
        if self.test_mode {
            &self.test_recipients
        } else {
            &self.recipients
        }
    }
}

/// SMTP credentials, resolved from the environment exactly once at process
/// start. No other component reads environment state.
#[derive(Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl MailCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        let user = env::var(SMTP_USER_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(SMTP_USER_ENV))?;
        let pass = env::var(SMTP_PASS_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(SMTP_PASS_ENV))?;
        Ok(Self { user, pass })
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.report.title.trim().is_empty() {
        return Err(ConfigError::Invalid("report.title must be non-empty"));
    }
    if cfg.report.attachment_name.trim().is_empty() {
        return Err(ConfigError::Invalid("report.attachment_name must be non-empty"));
    }

    if !cfg.feed.url.starts_with("http://") && !cfg.feed.url.starts_with("https://") {
        return Err(ConfigError::Invalid("feed.url must be an http(s) URL"));
    }
    if cfg.feed.timeout_seconds == 0 {
        return Err(ConfigError::Invalid("feed.timeout_seconds must be > 0"));
    }

    if cfg.mail.smtp_host.trim().is_empty() {
        return Err(ConfigError::Invalid("mail.smtp_host must be non-empty"));
    }
    if cfg.mail.recipients.is_empty() {
        return Err(ConfigError::Invalid("mail.recipients must list at least one address"));
    }
    if cfg.mail.test_mode && cfg.mail.test_recipients.is_empty() {
        return Err(ConfigError::Invalid(
            "mail.test_recipients must list at least one address when mail.test_mode is set",
        ));
    }

    Ok(())
}

/// Example YAML configuration, also used as the fixture in tests.
pub fn example() -> &'static str {
    r#"report:
  title: "Daily Barcode Report"
  timezone: "Asia/Manila"
  attachment_name: "daily-report.pdf"

feed:
  url: "https://dashproduction.x10.mx/masterfile/scanner/machining/barcode/scanner.json"
  timeout_seconds: 30

mail:
  smtp_host: "smtp.gmail.com"
  recipients:
    - "reports@example.com"
  test_mode: false
  test_recipients:
    - "reports.test@example.com"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.report.timezone, chrono_tz::Asia::Manila);
    }

    #[test]
    fn unknown_timezone_is_a_parse_error() {
        let bad = example().replace("Asia/Manila", "Mars/Olympus");
        assert!(serde_yaml::from_str::<Config>(&bad).is_err());
    }

    #[test]
    fn invalid_feed_url() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.feed.url = "ftp://example.com/feed.json".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("feed.url")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_empty_fields() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.report.title = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.report.attachment_name = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.feed.timeout_seconds = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.mail.smtp_host = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.mail.recipients.clear();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_mode_requires_test_recipients() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.mail.test_mode = true;
        cfg.mail.test_recipients.clear();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("test_recipients")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn effective_recipients_honors_test_mode() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        assert_eq!(cfg.mail.effective_recipients(), ["reports@example.com"]);
        cfg.mail.test_mode = true;
        assert_eq!(
            cfg.mail.effective_recipients(),
            ["reports.test@example.com"]
        );
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.mail.recipients, vec!["reports@example.com"]);
    }

    #[test]
    fn credentials_require_both_vars() {
        env::remove_var(SMTP_USER_ENV);
        env::remove_var(SMTP_PASS_ENV);
        assert!(matches!(
            MailCredentials::from_env(),
            Err(ConfigError::MissingCredential(v)) if v == SMTP_USER_ENV
        ));

        env::set_var(SMTP_USER_ENV, "bot@example.com");
        assert!(matches!(
            MailCredentials::from_env(),
            Err(ConfigError::MissingCredential(v)) if v == SMTP_PASS_ENV
        ));

        env::set_var(SMTP_PASS_ENV, "app-password");
        let creds = MailCredentials::from_env().unwrap();
        assert_eq!(creds.user, "bot@example.com");

        env::remove_var(SMTP_USER_ENV);
        env::remove_var(SMTP_PASS_ENV);
    }

    #[test]
    fn credential_debug_redacts_the_password() {
        let creds = MailCredentials {
            user: "bot@example.com".into(),
            pass: "super-secret".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("bot@example.com"));
        assert!(!rendered.contains("super-secret"));
    }
}
