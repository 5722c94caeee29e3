use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use remedy_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub api_version: String,
    pub config_dir: PathBuf,
    pub playbooks_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub audit_log_path: PathBuf,
    pub playbook_runner: String,
    pub action_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env_or("API_HOST", "127.0.0.1");
        let api_port = parse_env("API_PORT", 8000_u16)?;
        let api_version = env_or("API_VERSION", env!("CARGO_PKG_VERSION"));

        let action_timeout_seconds = parse_env("ACTION_TIMEOUT_SECONDS", 600_u64)?;
        if action_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "ACTION_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let playbook_runner = env_or("PLAYBOOK_RUNNER", "ansible-playbook");
        if playbook_runner.trim().is_empty() {
            return Err(AppError::Validation(
                "PLAYBOOK_RUNNER must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            api_host,
            api_port,
            api_version,
            config_dir: PathBuf::from(env_or("CONFIG_DIR", "config")),
            playbooks_dir: PathBuf::from(env_or("PLAYBOOKS_DIR", "playbooks")),
            scripts_dir: PathBuf::from(env_or("SCRIPTS_DIR", "scripts")),
            audit_log_path: PathBuf::from(env_or("AUDIT_LOG_PATH", "logs/audit.log")),
            playbook_runner,
            action_timeout: Duration::from_secs(action_timeout_seconds),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn parse_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
