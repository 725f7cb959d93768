pub mod cli;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_slug, validate_url, Validate};

/// Reads a required environment variable; empty values count as missing.
pub fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| EtlError::MissingEnv(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// IC Project instance credentials, sourced once at process start and passed
/// into the components that need them.
#[derive(Debug, Clone)]
pub struct IcpConfig {
    pub token: String,
    pub slug: String,
}

impl IcpConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            token: require_env("ICP_AUTHORIZATION_TOKEN")?,
            slug: require_env("ICP_INSTANCE_SLUG")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn api_url(&self) -> String {
        format!("https://app.icproject.com/api/instance/{}", self.slug)
    }

    /// Web UI base, used for operator-facing links in reports.
    pub fn instance_url(&self) -> String {
        format!("https://app.icproject.com/{}", self.slug)
    }
}

impl Validate for IcpConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("ICP_AUTHORIZATION_TOKEN", &self.token)?;
        validate_slug("ICP_INSTANCE_SLUG", &self.slug)?;
        Ok(())
    }
}

/// SMTP relay settings for the unpaid-invoice report mail.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
    pub send_from: String,
    pub send_to: String,
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self> {
        let port_raw = require_env("SMTP_PORT")?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| EtlError::InvalidConfigValue {
                field: "SMTP_PORT".to_string(),
                reason: format!("'{}' is not a valid port number", port_raw),
            })?;

        let config = Self {
            host: require_env("SMTP_HOST")?,
            port,
            username: require_env("SMTP_USERNAME")?,
            password: require_env("SMTP_PASSWORD")?,
            use_tls: optional_env("SMTP_USE_TLS").map(|v| truthy(&v)).unwrap_or(false),
            send_from: require_env("SEND_FROM")?,
            send_to: require_env("SEND_TO")?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for SmtpConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("SMTP_HOST", &self.host)?;
        validate_non_empty_string("SEND_FROM", &self.send_from)?;
        validate_non_empty_string("SEND_TO", &self.send_to)?;
        if self.port == 0 {
            return Err(EtlError::InvalidConfigValue {
                field: "SMTP_PORT".to_string(),
                reason: "port must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Apilo e-commerce API credentials plus the target kanban board for the
/// order mirror.
#[derive(Debug, Clone)]
pub struct ApiloConfig {
    pub slug: String,
    pub token: String,
    pub board_link: String,
    /// Optional `createdAfter` filter, ISO-8601.
    pub created_after: Option<String>,
}

impl ApiloConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            slug: require_env("APILO_INSTANCE_SLUG")?,
            token: require_env("APILO_ACCESS_TOKEN")?,
            board_link: require_env("ICP_BOARD_LINK")?,
            created_after: optional_env("APILO_CREATED_AFTER"),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn api_url(&self) -> String {
        format!("https://{}.apilo.com/rest/api", self.slug)
    }
}

impl Validate for ApiloConfig {
    fn validate(&self) -> Result<()> {
        validate_slug("APILO_INSTANCE_SLUG", &self.slug)?;
        validate_non_empty_string("APILO_ACCESS_TOKEN", &self.token)?;
        validate_url("ICP_BOARD_LINK", &self.board_link)?;
        Ok(())
    }
}
