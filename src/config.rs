use lettre::Address;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const ENV_CONFIG_PATH: &str = "LISTING_SNIPER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("malformed credential {name}: {reason}")]
    Credential { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub backend: LedgerBackend,
    /// Falls back to a backend-specific file name when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LedgerConfig {
    pub fn new(backend: LedgerBackend, path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| match self.backend {
            LedgerBackend::File => PathBuf::from("history.txt"),
            LedgerBackend::Sqlite => PathBuf::from("history.db"),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_server")]
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: default_smtp_server(),
            port: default_smtp_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub base_url: String,
    pub include_keywords: Vec<String>,
    /// Required even when empty; there is no implicit exclusion list.
    pub exclude_keywords: Vec<String>,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_request_headers")]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default)]
    pub max_retries: u8,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl AppConfig {
    /// A config with every optional field at its default and no keywords.
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            include_keywords: Vec::new(),
            exclude_keywords: Vec::new(),
            lookback_days: default_lookback_days(),
            request_headers: default_request_headers(),
            request_timeout_seconds: default_request_timeout_seconds(),
            page_delay_ms: default_page_delay_ms(),
            max_retries: 0,
            max_pages: default_max_pages(),
            ledger: LedgerConfig::default(),
            site_name: default_site_name(),
            repo_url: None,
            smtp: SmtpConfig::default(),
        }
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {}: {e}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid(format!("base_url scheme {other} is not http(s)"))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.include_keywords.is_empty() {
            return Err(ConfigError::Invalid("include_keywords must not be empty".into()));
        }
        if self.lookback_days < 1 {
            return Err(ConfigError::Invalid("lookback_days must be at least 1".into()));
        }
        if self.max_pages < 1 {
            return Err(ConfigError::Invalid("max_pages must be at least 1".into()));
        }
        // The sqlite backend cannot open a text ledger.
        let ledger_path = self.ledger.path();
        if self.ledger.backend == LedgerBackend::Sqlite
            && ledger_path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        {
            return Err(ConfigError::Invalid(format!(
                "ledger.path {} looks like a text ledger but backend is sqlite",
                ledger_path.display()
            )));
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.include_keywords = clean_keywords(std::mem::take(&mut self.include_keywords));
        self.exclude_keywords = clean_keywords(std::mem::take(&mut self.exclude_keywords));
        self.repo_url = self.repo_url.take().filter(|u| !u.trim().is_empty());
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    config.normalize();
    config.validate()?;
    Ok(config)
}

/// Trims, drops blanks and repeated entries while keeping the configured order.
fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let kw = item.trim();
        if !kw.is_empty() && !out.iter().any(|k| k == kw) {
            out.push(kw.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCredentials {
    pub sender: Address,
    pub password: String,
    pub receiver: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: i64,
}

/// Notification credentials. A channel is enabled only when all of its values are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelConfig {
    pub pushplus_token: Option<String>,
    pub email: Option<EmailCredentials>,
    pub telegram: Option<TelegramCredentials>,
}

impl ChannelConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let pushplus_token = get("PUSHPLUS_TOKEN");

        let email = match (get("SENDER_EMAIL"), get("EMAIL_PASS"), get("RECEIVER_EMAIL")) {
            (Some(sender), Some(password), Some(receiver)) => Some(EmailCredentials {
                sender: parse_address("SENDER_EMAIL", &sender)?,
                password,
                receiver: parse_address("RECEIVER_EMAIL", &receiver)?,
            }),
            (None, None, None) => None,
            _ => {
                warn!("E-mail channel partially configured; it stays disabled");
                None
            }
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => {
                let chat_id = chat_id.parse::<i64>().map_err(|e| ConfigError::Credential {
                    name: "TELEGRAM_CHAT_ID",
                    reason: e.to_string(),
                })?;
                Some(TelegramCredentials { bot_token, chat_id })
            }
            (None, None) => None,
            _ => {
                warn!("Telegram channel partially configured; it stays disabled");
                None
            }
        };

        Ok(Self {
            pushplus_token,
            email,
            telegram,
        })
    }
}

fn parse_address(name: &'static str, value: &str) -> Result<Address, ConfigError> {
    value.parse::<Address>().map_err(|e| ConfigError::Credential {
        name,
        reason: e.to_string(),
    })
}

fn default_lookback_days() -> u32 {
    3
}

fn default_request_timeout_seconds() -> u64 {
    15
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_max_pages() -> usize {
    50
}

fn default_site_name() -> String {
    "人才引进网".to_string()
}

fn default_smtp_server() -> String {
    "smtp.qq.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_request_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "User-Agent".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        ),
        (
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        (
            "Accept-Language".to_string(),
            "zh-CN,zh;q=0.9,en;q=0.8".to_string(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MINIMAL: &str = r#"{
        "base_url": "https://rcyjw.com/type_0.html",
        "include_keywords": [" 江苏 ", "上海", "", "江苏"],
        "exclude_keywords": []
    }"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.include_keywords, vec!["江苏".to_string(), "上海".to_string()]);
        assert_eq!(config.lookback_days, 3);
        assert_eq!(config.page_delay_ms, 1000);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.ledger.backend, LedgerBackend::File);
        assert_eq!(config.ledger.path(), PathBuf::from("history.txt"));
        assert_eq!(config.smtp.port, 465);
        assert!(config.request_headers.contains_key("User-Agent"));
    }

    #[test]
    fn exclude_keywords_are_required() {
        let raw = r#"{"base_url": "https://rcyjw.com/type_0.html", "include_keywords": ["江苏"]}"#;
        assert!(matches!(parse_config(raw), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_days = r#"{"base_url": "https://a.example/x.html", "include_keywords": ["a"],
            "exclude_keywords": [], "lookback_days": 0}"#;
        assert!(matches!(parse_config(zero_days), Err(ConfigError::Invalid(_))));

        let no_keywords = r#"{"base_url": "https://a.example/x.html", "include_keywords": ["  "],
            "exclude_keywords": []}"#;
        assert!(matches!(parse_config(no_keywords), Err(ConfigError::Invalid(_))));

        let bad_url = r#"{"base_url": "ftp://a.example/x", "include_keywords": ["a"],
            "exclude_keywords": []}"#;
        assert!(matches!(parse_config(bad_url), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn sqlite_backend_is_selectable() {
        let raw = r#"{"base_url": "https://a.example/x.html", "include_keywords": ["a"],
            "exclude_keywords": ["b"], "ledger": {"backend": "sqlite", "path": "ledger.db"}}"#;
        let config = parse_config(raw).unwrap();
        assert_eq!(config.ledger.backend, LedgerBackend::Sqlite);
        assert_eq!(config.ledger.path(), PathBuf::from("ledger.db"));
    }

    #[test]
    fn sqlite_backend_has_its_own_default_path() {
        let raw = r#"{"base_url": "https://a.example/x.html", "include_keywords": ["a"],
            "exclude_keywords": [], "ledger": {"backend": "sqlite"}}"#;
        let config = parse_config(raw).unwrap();
        assert_eq!(config.ledger.path(), PathBuf::from("history.db"));
    }

    #[test]
    fn sqlite_backend_rejects_text_ledger_path() {
        let raw = r#"{"base_url": "https://a.example/x.html", "include_keywords": ["a"],
            "exclude_keywords": [], "ledger": {"backend": "sqlite", "path": "state/history.TXT"}}"#;
        assert!(matches!(parse_config(raw), Err(ConfigError::Invalid(msg)) if msg.contains("sqlite")));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn channels_follow_credential_presence() {
        let none = ChannelConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(none, ChannelConfig::default());

        let all = ChannelConfig::from_lookup(lookup(&[
            ("PUSHPLUS_TOKEN", "tok"),
            ("SENDER_EMAIL", "bot@example.com"),
            ("EMAIL_PASS", "secret"),
            ("RECEIVER_EMAIL", "me@example.com"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-10042"),
        ]))
        .unwrap();
        assert_eq!(all.pushplus_token.as_deref(), Some("tok"));
        assert_eq!(all.email.unwrap().receiver.to_string(), "me@example.com");
        assert_eq!(all.telegram.unwrap().chat_id, -100_42);
    }

    #[test]
    fn partial_email_credentials_disable_the_channel() {
        let partial = ChannelConfig::from_lookup(lookup(&[
            ("SENDER_EMAIL", "bot@example.com"),
            ("EMAIL_PASS", ""),
        ]))
        .unwrap();
        assert!(partial.email.is_none());
    }

    #[test]
    fn malformed_credentials_are_errors() {
        let bad_mail = ChannelConfig::from_lookup(lookup(&[
            ("SENDER_EMAIL", "not-an-address"),
            ("EMAIL_PASS", "x"),
            ("RECEIVER_EMAIL", "me@example.com"),
        ]));
        assert!(matches!(bad_mail, Err(ConfigError::Credential { name: "SENDER_EMAIL", .. })));

        let bad_chat = ChannelConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "abc"),
        ]));
        assert!(matches!(bad_chat, Err(ConfigError::Credential { name: "TELEGRAM_CHAT_ID", .. })));
    }
}
