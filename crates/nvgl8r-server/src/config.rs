use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_MAX_PHOTOS: usize = 5;

/// Upstream server that receives uploads instead of local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub host: String,
    pub port: u16,
}

impl FromStr for RelayTarget {
    type Err = anyhow::Error;

    /// Parses `host:port`.
    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected host:port, got {:?}", s))?;
        if host.is_empty() {
            bail!("relay host is empty in {:?}", s);
        }
        let port = port
            .parse()
            .with_context(|| format!("invalid relay port in {:?}", s))?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for RelayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Server settings, read from `NVGL8R_*` environment variables.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub relay: Option<RelayTarget>,
    pub static_dir: PathBuf,
    pub photos_dir: PathBuf,
    pub max_photos: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"[REDACTED]")
            .field("relay", &self.relay)
            .field("static_dir", &self.static_dir)
            .field("photos_dir", &self.photos_dir)
            .field("max_photos", &self.max_photos)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let password = lookup("NVGL8R_PASSWORD").unwrap_or_default();
        if password.is_empty() {
            bail!("NVGL8R_PASSWORD is unset or empty");
        }

        let host = lookup("NVGL8R_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("NVGL8R_PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid NVGL8R_PORT {:?}", v))?,
            None => DEFAULT_PORT,
        };
        let relay = lookup("NVGL8R_RELAY")
            .filter(|v| !v.is_empty())
            .map(|v| v.parse::<RelayTarget>())
            .transpose()
            .context("invalid NVGL8R_RELAY")?;
        let max_photos = match lookup("NVGL8R_MAX_PHOTOS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid NVGL8R_MAX_PHOTOS {:?}", v))?,
            None => DEFAULT_MAX_PHOTOS,
        };
        if max_photos == 0 {
            bail!("NVGL8R_MAX_PHOTOS must be at least 1");
        }

        let static_dir = absolute_dir(lookup("NVGL8R_STATIC_DIR").unwrap_or_else(|| "static".into()))?;
        let photos_dir = absolute_dir(lookup("NVGL8R_PHOTOS_DIR").unwrap_or_else(|| "photos".into()))?;

        Ok(Self {
            host,
            port,
            password,
            relay,
            static_dir,
            photos_dir,
            max_photos,
        })
    }
}

fn absolute_dir(dir: String) -> Result<PathBuf> {
    std::path::absolute(&dir).with_context(|| format!("cannot resolve directory {:?}", dir))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("NVGL8R_PASSWORD", "hunter2")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_photos, DEFAULT_MAX_PHOTOS);
        assert!(config.relay.is_none());
        assert!(config.static_dir.is_absolute());
        assert!(config.photos_dir.ends_with("photos"));
    }

    #[test]
    fn password_is_required() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("NVGL8R_PASSWORD", "")]).is_err());
    }

    #[test]
    fn relay_target_parses() {
        let config = config_from(&[
            ("NVGL8R_PASSWORD", "pw"),
            ("NVGL8R_RELAY", "10.0.0.2:9000"),
        ])
        .unwrap();
        assert_eq!(
            config.relay,
            Some(RelayTarget {
                host: "10.0.0.2".into(),
                port: 9000
            })
        );
        assert_eq!(config.relay.unwrap().to_string(), "10.0.0.2:9000");
    }

    #[test]
    fn bad_relay_is_rejected() {
        for bad in ["nohost", ":9000", "host:", "host:port", "a:b:c", "host:70000"] {
            let result = config_from(&[("NVGL8R_PASSWORD", "pw"), ("NVGL8R_RELAY", bad)]);
            assert!(result.is_err(), "{:?} accepted", bad);
        }
    }

    #[test]
    fn zero_max_photos_is_rejected() {
        let result = config_from(&[("NVGL8R_PASSWORD", "pw"), ("NVGL8R_MAX_PHOTOS", "0")]);
        assert!(result.is_err());
    }

    #[test]
    fn debug_hides_password() {
        let config = config_from(&[("NVGL8R_PASSWORD", "hunter2")]).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
