use crate::{Error, Result};
use std::time::Duration;
use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    pub admin_username: String,
    pub admin_password: String,
    pub permission_cache_ttl: Duration,
    pub elevated_roles: Vec<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_ADMIN_USERNAME: &str = "admin";
    const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_PERMISSION_CACHE_TTL_SECS: u64 = 30;
    const DEFAULT_ELEVATED_ROLES: &str = "admin";
    const MAX_PERMISSION_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_port = lookup("ITROOM_HTTP_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(Self::DEFAULT_HTTP_PORT);

        let ttl_secs = lookup("ITROOM_PERMISSION_CACHE_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_PERMISSION_CACHE_TTL_SECS);

        Self {
            host: lookup("ITROOM_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port,
            data_dir: lookup("ITROOM_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            admin_username: lookup("ITROOM_ADMIN_USERNAME")
                .map(|name| name.trim().to_string())
                .unwrap_or_else(|| Self::DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: lookup("ITROOM_ADMIN_PASSWORD").unwrap_or_else(|| {
                warn!("ITROOM_ADMIN_PASSWORD not set, using default password 'admin123'");
                warn!("Please change the default admin password immediately!");
                Self::DEFAULT_ADMIN_PASSWORD.to_string()
            }),
            permission_cache_ttl: Duration::from_secs(ttl_secs),
            elevated_roles: split_list(
                &lookup("ITROOM_ELEVATED_ROLES")
                    .unwrap_or_else(|| Self::DEFAULT_ELEVATED_ROLES.to_string()),
            ),
            allowed_origins: split_list(
                &lookup("ITROOM_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            ),
        }
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.admin_username.is_empty() {
            return Err(Error::Config("ITROOM_ADMIN_USERNAME must not be empty".into()));
        }
        if self.permission_cache_ttl.as_secs() > Self::MAX_PERMISSION_CACHE_TTL_SECS {
            return Err(Error::Config(format!(
                "ITROOM_PERMISSION_CACHE_TTL_SECS must be at most {}",
                Self::MAX_PERMISSION_CACHE_TTL_SECS
            )));
        }
        // Permission records can only be administered by an elevated role
        if self.elevated_roles.is_empty() {
            return Err(Error::Config("ITROOM_ELEVATED_ROLES must name at least one role".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
