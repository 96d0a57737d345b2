use crate::domain::ContactEmail;
use config::{Config, Environment, File, FileFormat};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;

/// Retrieve the configuration for the application.
///
/// Values are layered, later sources winning:
/// 1. `configuration.yaml`
/// 2. `APP_`-prefixed environment variables, e.g. `APP_EMAIL__OWNER_NAME`
/// 3. the plain variables used by earlier deployments (`PORT`, `FRONTEND_URL`,
///    `EMAIL_SERVICE`, `EMAIL_USER` and `EMAIL_PASSWORD`)
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    Config::builder()
        .add_source(File::new("configuration.yaml", FileFormat::Yaml))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .set_override_option("application.allowed_origin", std::env::var("FRONTEND_URL").ok())?
        .set_override_option("email.service", std::env::var("EMAIL_SERVICE").ok())?
        .set_override_option("email.username", std::env::var("EMAIL_USER").ok())?
        .set_override_option("email.password", std::env::var("EMAIL_PASSWORD").ok())?
        .build()?
        .try_deserialize()
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email: EmailSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Origin of the portfolio site allowed to call the API from a browser.
    pub allowed_origin: String,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RateLimitSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_requests: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_seconds: u64,
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Which kind of relay outgoing mail is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailTransport {
    Smtp,
    Http,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailSettings {
    pub transport: EmailTransport,
    /// Well-known SMTP service name, e.g. `gmail`. Ignored when `smtp_host` is set.
    pub service: String,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    /// Base url of the HTTP email API, required for the `http` transport.
    pub base_url: Option<String>,
    pub authorization_token: Secret<String>,
    /// Account used to authenticate with the relay, passed on as written.
    pub username: String,
    pub password: Secret<String>,
    /// The `From` address. Defaults to `username`, which only works when the
    /// relay login is itself an email address.
    pub sender_address: Option<String>,
    /// Where owner notifications are delivered. Defaults to the sender.
    pub owner_address: Option<String>,
    /// Signature used in the acknowledgement sent back to visitors.
    pub owner_name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailSettings {
    /// Configured addresses are used exactly as written, never normalized.
    pub fn sender(&self) -> Result<ContactEmail, String> {
        let address = self.sender_address.as_ref().unwrap_or(&self.username);
        ContactEmail::parse_verbatim(address.clone()).map_err(|e| {
            format!("Invalid sender address `{address}`: {e}; set `email.sender_address`")
        })
    }

    pub fn owner(&self) -> Result<ContactEmail, String> {
        match &self.owner_address {
            Some(address) => ContactEmail::parse_verbatim(address.clone())
                .map_err(|e| format!("Invalid owner address `{address}`: {e}")),
            None => self.sender(),
        }
    }

    pub fn base_url(&self) -> Result<url::Url, String> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| "`email.base_url` is required for the http transport".to_string())?;
        url::Url::parse(base_url).map_err(|e| format!("Invalid email base url `{base_url}`: {e}"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}
