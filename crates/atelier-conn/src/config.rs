//! Connection configuration and per-driver validation.

use crate::driver::Driver;
use atelier_core::{AtelierError, Result, Settings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

/// One named entry under `connections.databases`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub driver: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    /// Maximum pool size when a pooled connection is requested
    #[serde(default)]
    pub pool: Option<u32>,
}

impl ConnectionConfig {
    /// Parse all configured connections from a settings document.
    pub fn from_settings(settings: &Settings) -> Result<BTreeMap<String, ConnectionConfig>> {
        let mut out = BTreeMap::new();
        let Some(databases) = settings
            .get("connections.databases")
            .and_then(|v| v.as_mapping())
        else {
            return Ok(out);
        };

        for (key, value) in databases {
            let Some(name) = key.as_str() else { continue };
            let config: ConnectionConfig =
                serde_yaml::from_value(value.clone()).map_err(|e| {
                    AtelierError::InvalidConnection {
                        name: name.to_string(),
                        message: e.to_string(),
                    }
                })?;
            out.insert(name.to_string(), config);
        }
        Ok(out)
    }

    /// Resolve the declared driver name
    pub fn driver(&self) -> Result<Driver> {
        self.driver.parse()
    }

    /// Validate the config for its driver. Fails fast with field-specific
    /// errors; no network activity happens here.
    pub fn validate(&self, name: &str) -> Result<Driver> {
        let driver = self.driver()?;

        if driver.is_network() {
            self.require(name, driver, "host", self.host.as_deref())?;
            self.require(name, driver, "database", self.database.as_deref())?;
            self.require(name, driver, "user", self.user.as_deref())?;
            self.require(name, driver, "password", self.password.as_deref())?;

            let host = self.host.as_deref().unwrap_or_default();
            if !valid_host(host) {
                return Err(AtelierError::InvalidConnection {
                    name: name.to_string(),
                    message: format!("`{}` is not a valid hostname or IP address", host),
                });
            }

            match self.port {
                Some(0) => {
                    return Err(AtelierError::InvalidConnection {
                        name: name.to_string(),
                        message: "port must be 1..=65535".to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    if driver.default_port().is_none() {
                        return Err(AtelierError::MissingField {
                            name: name.to_string(),
                            driver: driver.to_string(),
                            field: "port".to_string(),
                        });
                    }
                }
            }
        } else {
            // Embedded drivers take a file path in `database`
            let path = self.database.as_deref().filter(|p| !p.is_empty()).ok_or(
                AtelierError::MissingField {
                    name: name.to_string(),
                    driver: driver.to_string(),
                    field: "database".to_string(),
                },
            )?;
            let parent = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(parent) = parent {
                if !parent.exists() {
                    return Err(AtelierError::InvalidConnection {
                        name: name.to_string(),
                        message: format!(
                            "parent directory of `{}` does not exist",
                            path
                        ),
                    });
                }
            }
        }

        Ok(driver)
    }

    fn require(
        &self,
        name: &str,
        driver: Driver,
        field: &str,
        value: Option<&str>,
    ) -> Result<()> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(()),
            _ => Err(AtelierError::MissingField {
                name: name.to_string(),
                driver: driver.to_string(),
                field: field.to_string(),
            }),
        }
    }
}

fn valid_host(host: &str) -> bool {
    if host.is_empty() {
        return false;
    }
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    // RFC 1123 hostname: dot-separated labels of alphanumerics and hyphens
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}
