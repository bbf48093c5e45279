//! Supported database drivers

use atelier_core::AtelierError;
use serde::{Deserialize, Serialize};

/// Supported database drivers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Postgres,
    Mysql,
    Sqlserver,
    Duckdb,
    Sqlite,
}

impl Driver {
    /// Get all supported drivers
    pub fn all() -> &'static [Driver] {
        &[
            Driver::Postgres,
            Driver::Mysql,
            Driver::Sqlserver,
            Driver::Duckdb,
            Driver::Sqlite,
        ]
    }

    /// Get the driver name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::Mysql => "mysql",
            Driver::Sqlserver => "sqlserver",
            Driver::Duckdb => "duckdb",
            Driver::Sqlite => "sqlite",
        }
    }

    /// The URL scheme used in this driver's DSN
    pub fn scheme(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::Mysql => "mysql",
            Driver::Sqlserver => "mssql",
            Driver::Duckdb => "duckdb",
            Driver::Sqlite => "sqlite",
        }
    }

    /// Whether this driver talks to a network server (as opposed to an
    /// embedded file database)
    pub fn is_network(&self) -> bool {
        matches!(self, Driver::Postgres | Driver::Mysql | Driver::Sqlserver)
    }

    /// Default port for network drivers
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Driver::Postgres => Some(5432),
            Driver::Mysql => Some(3306),
            Driver::Sqlserver => Some(1433),
            Driver::Duckdb | Driver::Sqlite => None,
        }
    }

    /// Whether connections can actually be opened with the bundled stack
    pub fn is_connectable(&self) -> bool {
        matches!(self, Driver::Postgres | Driver::Mysql | Driver::Sqlite)
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Driver {
    type Err = AtelierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            "mysql" | "mariadb" => Ok(Driver::Mysql),
            "sqlserver" | "mssql" => Ok(Driver::Sqlserver),
            "duckdb" => Ok(Driver::Duckdb),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(AtelierError::UnsupportedDriver(format!(
                "{} (supported: {})",
                other,
                Driver::all()
                    .iter()
                    .map(Driver::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}
