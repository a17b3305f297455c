use std::{
    fmt,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
};

use nong_core::{AssignConfig, CoreError};
use nong_observe::{LoggerConfig, LoggerError, LoggerLevel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_CONFIG: &str = "NONG_CONFIG";
pub const ENV_LISTEN: &str = "NONG_LISTEN";
pub const ENV_DATABASE: &str = "NONG_DATABASE";
pub const ENV_POOL_CAPACITY: &str = "NONG_POOL_CAPACITY";
pub const ENV_LOG_LEVEL: &str = "NONG_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Backing store selection: `"memory"` or a SQLite file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(PathBuf),
}

impl FromStr for Database {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl From<String> for Database {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "" | "memory" | ":memory:" => Database::Memory,
            path => Database::Sqlite(PathBuf::from(path)),
        }
    }
}

impl From<Database> for String {
    fn from(db: Database) -> Self {
        db.to_string()
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Database::Memory => f.write_str("memory"),
            Database::Sqlite(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Daemon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    pub listen: SocketAddr,
    pub database: Database,
    pub assign: AssignConfig,
    pub logger: LoggerConfig,
    /// JSON seed file applied to a fresh store at startup.
    pub seed: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database: Database::default(),
            assign: AssignConfig::default(),
            logger: LoggerConfig::default(),
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Load from `$NONG_CONFIG` (if set), apply env overrides and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from environment variables resolved through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(ENV_LISTEN) {
            self.listen = raw.trim().parse().map_err(|e| env_error(ENV_LISTEN, e))?;
        }
        if let Some(raw) = lookup(ENV_DATABASE) {
            self.database = Database::from(raw);
        }
        if let Some(raw) = lookup(ENV_POOL_CAPACITY) {
            self.assign.pool_capacity = raw
                .trim()
                .parse()
                .map_err(|e| env_error(ENV_POOL_CAPACITY, e))?;
        }
        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            self.logger.level = LoggerLevel::new(raw)
                .map_err(|e: LoggerError| env_error(ENV_LOG_LEVEL, e))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.assign.validate()?;
        Ok(())
    }
}

fn env_error(var: &'static str, err: impl fmt::Display) -> ConfigError {
    ConfigError::Env {
        var,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = AgentConfig::default();
        assert_eq!(config.database, Database::Memory);
        assert_eq!(config.assign.max_iterations, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_json() {
        let config: AgentConfig = serde_json::from_str(
            r#"{
                "listen": "0.0.0.0:9000",
                "database": "/var/lib/nong/nong.sqlite3",
                "assign": { "poolCapacity": 250 },
                "logger": { "format": "json" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.listen.port(), 9000);
        assert_eq!(
            config.database,
            Database::Sqlite(PathBuf::from("/var/lib/nong/nong.sqlite3"))
        );
        assert_eq!(config.assign.pool_capacity, 250);
        assert_eq!(config.assign.max_iterations, 100);
        assert!(config.seed.is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AgentConfig::default();
        config
            .apply_env(env(&[
                (ENV_LISTEN, "127.0.0.1:7000"),
                (ENV_DATABASE, ":memory:"),
                (ENV_POOL_CAPACITY, " 42 "),
                (ENV_LOG_LEVEL, "nong_core=debug,info"),
            ]))
            .unwrap();
        assert_eq!(config.listen.port(), 7000);
        assert_eq!(config.database, Database::Memory);
        assert_eq!(config.assign.pool_capacity, 42);
        assert_eq!(config.logger.level.as_str(), "nong_core=debug,info");
    }

    #[test]
    fn bad_env_values_name_the_variable() {
        let mut config = AgentConfig::default();
        let err = config
            .apply_env(env(&[(ENV_POOL_CAPACITY, "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_POOL_CAPACITY, .. }));

        let err = config
            .apply_env(env(&[(ENV_LISTEN, "nowhere")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_LISTEN, .. }));
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let mut config = AgentConfig::default();
        config.apply_env(env(&[(ENV_POOL_CAPACITY, "0")])).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn database_string_forms() {
        assert_eq!("memory".parse::<Database>().unwrap(), Database::Memory);
        assert_eq!(
            "./data.db".parse::<Database>().unwrap(),
            Database::Sqlite(PathBuf::from("./data.db"))
        );
        assert_eq!(
            serde_json::to_string(&Database::Memory).unwrap(),
            r#""memory""#
        );
    }
}
