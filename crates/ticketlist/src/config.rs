//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::ticket::MAX_CAPACITY;

/// Default number of simultaneous lists.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Environment variable overriding the capacity in [`StoreConfig::from_env`].
pub const CAPACITY_ENV: &str = "TICKETLIST_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Fixed number of slots; the table never grows past it.
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Read `TICKETLIST_CAPACITY`, falling back to the default when it is
    /// unset or not a number.
    pub fn from_env() -> Self {
        Self {
            capacity: capacity_from(std::env::var(CAPACITY_ENV).ok().as_deref()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Check that every slot can be addressed by a ticket.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }
}

fn capacity_from(value: Option<&str>) -> usize {
    value
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_CAPACITY)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse store config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("capacity must be at least 1")]
    ZeroCapacity,

    #[error("capacity {requested} exceeds the ticket locator space ({max} slots)")]
    CapacityTooLarge { requested: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_historical_limit() {
        let config = StoreConfig::default();
        assert_eq!(config.capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn capacity_from_env_value() {
        assert_eq!(capacity_from(Some("16")), 16);
        assert_eq!(capacity_from(Some(" 8 ")), 8);
        assert_eq!(capacity_from(Some("lots")), DEFAULT_CAPACITY);
        assert_eq!(capacity_from(Some("-1")), DEFAULT_CAPACITY);
        assert_eq!(capacity_from(None), DEFAULT_CAPACITY);
    }

    #[test]
    fn from_json_fills_defaults() {
        let config = StoreConfig::from_json("{}").unwrap();
        assert_eq!(config, StoreConfig::default());

        let config = StoreConfig::from_json(r#"{"capacity": 4}"#).unwrap();
        assert_eq!(config.capacity, 4);
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let err = StoreConfig::from_json(r#"{"capacity": 4, "max_nodes": 10}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validate_bounds() {
        assert!(matches!(
            StoreConfig::default().with_capacity(0).validate(),
            Err(ConfigError::ZeroCapacity)
        ));
        assert!(StoreConfig::default().with_capacity(MAX_CAPACITY).validate().is_ok());

        let err = StoreConfig::from_json(&format!(r#"{{"capacity": {}}}"#, MAX_CAPACITY + 1))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "capacity {} exceeds the ticket locator space ({MAX_CAPACITY} slots)",
                MAX_CAPACITY + 1
            )
        );
    }

    #[test]
    fn config_serializes() {
        insta::assert_json_snapshot!(StoreConfig::default().with_capacity(8), @r#"
        {
          "capacity": 8
        }
        "#);
    }
}
