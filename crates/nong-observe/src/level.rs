use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{LoggerError, LoggerResult};

/// Validated `EnvFilter` directive string, e.g. `"info"` or `"nong_core=debug,info"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(s: impl Into<String>) -> LoggerResult<Self> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter for a subscriber.
    pub fn to_env_filter(&self) -> LoggerResult<EnvFilter> {
        parse_filter(&self.0)
    }
}

fn parse_filter(directives: &str) -> LoggerResult<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| LoggerError::InvalidLevel(format!("{directives}: {e}")))
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_filter(&s)?;
        Ok(Self(s))
    }
}

impl From<LoggerLevel> for String {
    fn from(level: LoggerLevel) -> Self {
        level.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_targeted_directives() {
        for input in ["info", "warn", "trace", "nong_core=debug,nong_store=trace,info"] {
            let level: LoggerLevel = input.parse().unwrap();
            assert_eq!(level.as_str(), input);
            assert!(level.to_env_filter().is_ok());
        }
    }

    #[test]
    fn rejects_bad_directives() {
        for input in ["nong_core=loud", "info,nong_api=sometimes"] {
            assert!(matches!(
                input.parse::<LoggerLevel>(),
                Err(LoggerError::InvalidLevel(_))
            ));
        }
    }

    #[test]
    fn default_is_info() {
        assert_eq!(LoggerLevel::default().as_str(), "info");
    }

    #[test]
    fn deserialization_validates() {
        let ok: LoggerLevel = serde_json::from_str(r#""debug""#).unwrap();
        assert_eq!(ok, LoggerLevel::new("debug").unwrap());
        assert!(serde_json::from_str::<LoggerLevel>(r#""x=nope""#).is_err());
    }
}
