//! Layered configuration: defaults, then an optional TOML file, then environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "gateway.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Server,
    Stdio,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(Mode::Server),
            "stdio" => Ok(Mode::Stdio),
            other => Err(ConfigError::Invalid(format!(
                "Invalid MODE: {other}. Must be 'server' or 'stdio'"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Server => "server",
            Mode::Stdio => "stdio",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub mode: Mode,
    pub port: u16,
    pub deprecate_rest: bool,
    pub cors_origins: Vec<String>,
    pub call_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Server,
            port: 8080,
            deprecate_rest: false,
            cors_origins: Vec::new(),
            call_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// HTTP settings for one remote collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub retries: Option<u32>,
}

impl ToolConfig {
    /// Configured, non-blank base URL.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    #[serde(flatten)]
    pub http: ToolConfig,
    pub secret_key: Option<String>,
    pub price_id: Option<String>,
    pub public_url: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            http: ToolConfig::default(),
            secret_key: None,
            price_id: None,
            public_url: "http://localhost:3000".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    #[serde(flatten)]
    pub http: ToolConfig,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub recipient: String,
    pub sender: String,
    pub window_secs: u64,
    pub max_per_window: u32,
    /// Key callers on `X-Forwarded-For` (the hop our proxy appended) instead of the peer address.
    pub trust_proxy: bool,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            recipient: "concierge@localhost".into(),
            sender: "Concierge Gateway <noreply@localhost>".into(),
            window_secs: 60,
            max_per_window: 1,
            trust_proxy: false,
        }
    }
}

impl ContactConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub vector: ToolConfig,
    pub payments: PaymentsConfig,
    pub mail: MailConfig,
    pub contact: ContactConfig,
}

impl AppConfig {
    /// File named by `GATEWAY_CONFIG` (must exist) or `gateway.toml` (optional),
    /// then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("GATEWAY_CONFIG").ok().filter(|s| !s.trim().is_empty());
        let mut cfg = match explicit {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env<F>(&mut self, get: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MODE") {
            self.server.mode = v.parse()?;
        }
        // Unparseable ports fall back to whatever was already configured.
        if let Some(port) = get("PORT").and_then(|s| s.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if get("DEPRECATE_REST").is_some() {
            self.server.deprecate_rest = true;
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(ms) = get("TOOL_CALL_TIMEOUT_MS") {
            self.server.call_timeout_ms = parse_num("TOOL_CALL_TIMEOUT_MS", &ms)?;
        }

        if let Some(url) = get("CHROMA_URL") {
            self.vector.base_url = Some(url);
        }

        if let Some(key) = get("STRIPE_SECRET_KEY") {
            self.payments.secret_key = Some(key);
        }
        if let Some(price) = get("STRIPE_PRICE_ID") {
            self.payments.price_id = Some(price);
        }
        if let Some(base) = get("STRIPE_API_BASE") {
            self.payments.http.base_url = Some(base);
        }
        if let Some(url) = get("PUBLIC_URL") {
            self.payments.public_url = url;
        }

        if let Some(url) = get("MAIL_RELAY_URL") {
            self.mail.http.base_url = Some(url);
        }
        if let Some(token) = get("MAIL_RELAY_TOKEN") {
            self.mail.token = Some(token);
        }

        if let Some(to) = get("CONTACT_RECIPIENT") {
            self.contact.recipient = to;
        }
        if let Some(from) = get("CONTACT_SENDER") {
            self.contact.sender = from;
        }
        if let Some(secs) = get("CONTACT_WINDOW_SECS") {
            self.contact.window_secs = parse_num("CONTACT_WINDOW_SECS", &secs)?;
        }
        if let Some(max) = get("CONTACT_MAX_PER_WINDOW") {
            self.contact.max_per_window = parse_num("CONTACT_MAX_PER_WINDOW", &max)?;
        }
        if let Some(flag) = get("TRUST_PROXY") {
            self.contact.trust_proxy =
                matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.mode == Mode::Server && self.server.port == 0 {
            return Err(ConfigError::Invalid("PORT cannot be 0".into()));
        }
        if self.server.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid("TOOL_CALL_TIMEOUT_MS cannot be 0".into()));
        }
        if self.contact.window_secs == 0 {
            return Err(ConfigError::Invalid("CONTACT_WINDOW_SECS cannot be 0".into()));
        }
        if self.contact.max_per_window == 0 {
            return Err(ConfigError::Invalid("CONTACT_MAX_PER_WINDOW cannot be 0".into()));
        }
        Ok(())
    }
}

fn parse_num<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key} must be a number, got '{raw}'")))
}
