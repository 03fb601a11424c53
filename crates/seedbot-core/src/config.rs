//! Environment-driven configuration for Seedbot.
//!
//! All settings come from the process environment (optionally seeded from
//! an env file by the binary). They are resolved once at startup into a
//! [`BotConfig`] that never changes afterwards.
//!
//! # Environment Variables
//!
//! Required:
//! - `TG_BOT_TOKEN`: Telegram bot token
//! - `AUTHORIZED_CHAT_ID`: the only chat allowed to issue commands
//!
//! Optional:
//! - `TRANSMISSION_HOST` (default `localhost`)
//! - `TRANSMISSION_PORT` (default `9091`)
//! - `TRANSMISSION_RPC_PATH` (default `/transmission/rpc`)
//! - `TRANSMISSION_USERNAME`, `TRANSMISSION_PASSWORD`
//! - `NOTIFY_INTERVAL_SECS` (default `30`)
//! - `STATUS_COMMAND` (default `uptime && df -h / | tail -1`)
//! - `BASE_URL`, `BASE_DIR`: reserved for download links, currently unused

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{CoreError, Result};

pub const BOT_TOKEN_ENV: &str = "TG_BOT_TOKEN";
pub const TRANSMISSION_HOST_ENV: &str = "TRANSMISSION_HOST";
pub const TRANSMISSION_PORT_ENV: &str = "TRANSMISSION_PORT";
pub const TRANSMISSION_RPC_PATH_ENV: &str = "TRANSMISSION_RPC_PATH";
pub const TRANSMISSION_USERNAME_ENV: &str = "TRANSMISSION_USERNAME";
pub const TRANSMISSION_PASSWORD_ENV: &str = "TRANSMISSION_PASSWORD";
pub const AUTHORIZED_CHAT_ID_ENV: &str = "AUTHORIZED_CHAT_ID";
pub const NOTIFY_INTERVAL_ENV: &str = "NOTIFY_INTERVAL_SECS";
pub const STATUS_COMMAND_ENV: &str = "STATUS_COMMAND";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const BASE_DIR_ENV: &str = "BASE_DIR";

const DEFAULT_TRANSMISSION_HOST: &str = "localhost";
const DEFAULT_TRANSMISSION_PORT: u16 = 9091;
const DEFAULT_RPC_PATH: &str = "/transmission/rpc";
const DEFAULT_NOTIFY_INTERVAL_SECS: u64 = 30;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_BASE_DIR: &str = "/downloads";

/// Shell command whose output is appended to the `/status` report.
pub const DEFAULT_STATUS_COMMAND: &str = "uptime && df -h / | tail -1";

/// Name of the per-user config directory.
const CONFIG_DIR_NAME: &str = "seedbot";

/// Connection settings for the Transmission daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
    pub rpc_path: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DaemonConfig {
    /// Full URL of the RPC endpoint.
    pub fn rpc_url(&self) -> Result<Url> {
        let raw = format!("http://{}:{}", self.host, self.port);
        let base = Url::parse(&raw).map_err(|e| CoreError::InvalidEnv {
            name: TRANSMISSION_HOST_ENV,
            reason: e.to_string(),
        })?;
        base.join(&self.rpc_path).map_err(|e| CoreError::InvalidEnv {
            name: TRANSMISSION_RPC_PATH_ENV,
            reason: e.to_string(),
        })
    }
}

/// Resolved bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub authorized_chat_id: i64,
    pub daemon: DaemonConfig,
    pub notify_interval: Duration,
    pub status_command: String,
    /// Reserved for download links; nothing reads it yet.
    pub base_url: String,
    /// Reserved for download links; nothing reads it yet.
    pub base_dir: PathBuf,
}

impl BotConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_token = get(BOT_TOKEN_ENV).ok_or(CoreError::MissingEnv(BOT_TOKEN_ENV))?;

        let authorized_chat_id = get(AUTHORIZED_CHAT_ID_ENV)
            .ok_or(CoreError::MissingEnv(AUTHORIZED_CHAT_ID_ENV))
            .and_then(|raw| parse_number(AUTHORIZED_CHAT_ID_ENV, &raw))?;

        let port = match get(TRANSMISSION_PORT_ENV) {
            Some(raw) => parse_number(TRANSMISSION_PORT_ENV, &raw)?,
            None => DEFAULT_TRANSMISSION_PORT,
        };

        let notify_secs: u64 = match get(NOTIFY_INTERVAL_ENV) {
            Some(raw) => parse_number(NOTIFY_INTERVAL_ENV, &raw)?,
            None => DEFAULT_NOTIFY_INTERVAL_SECS,
        };
        if notify_secs == 0 {
            return Err(CoreError::InvalidEnv {
                name: NOTIFY_INTERVAL_ENV,
                reason: "interval must be at least one second".to_string(),
            });
        }

        let daemon = DaemonConfig {
            host: get(TRANSMISSION_HOST_ENV).unwrap_or_else(|| DEFAULT_TRANSMISSION_HOST.to_string()),
            port,
            rpc_path: get(TRANSMISSION_RPC_PATH_ENV).unwrap_or_else(|| DEFAULT_RPC_PATH.to_string()),
            username: get(TRANSMISSION_USERNAME_ENV),
            password: get(TRANSMISSION_PASSWORD_ENV),
        };
        // Fail at startup rather than on the first command.
        daemon.rpc_url()?;

        Ok(Self {
            bot_token,
            authorized_chat_id,
            daemon,
            notify_interval: Duration::from_secs(notify_secs),
            status_command: get(STATUS_COMMAND_ENV)
                .unwrap_or_else(|| DEFAULT_STATUS_COMMAND.to_string()),
            base_url: get(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            base_dir: get(BASE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR)),
        })
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| CoreError::InvalidEnv {
        name,
        reason: e.to_string(),
    })
}

/// Path of the per-user env file (`~/.config/seedbot/.env` on Linux).
pub fn env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(".env"))
}
