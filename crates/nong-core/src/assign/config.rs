use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default bound on persist attempts per assignment round.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default number of partner identities in the pool.
pub const DEFAULT_POOL_CAPACITY: u64 = 100;

/// Assignment engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignConfig {
    /// Total partner identities in the pool; bounds the number of double assignments.
    pub pool_capacity: u64,
    /// Persist attempts before a round reports exhaustion.
    pub max_iterations: u32,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl AssignConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.pool_capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "poolCapacity cannot be zero".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(CoreError::InvalidConfig(
                "maxIterations cannot be zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AssignConfig::default();
        assert_eq!(cfg.max_iterations, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_deserialization_keeps_defaults() {
        let cfg: AssignConfig = serde_json::from_str(r#"{"poolCapacity": 240}"#).unwrap();
        assert_eq!(cfg.pool_capacity, 240);
        assert_eq!(cfg.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn zero_values_are_rejected() {
        let cfg = AssignConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidConfig(_))));

        let cfg = AssignConfig {
            pool_capacity: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
