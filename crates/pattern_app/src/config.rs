//! Application configuration.
//!
//! Settings come from an optional JSON file; any field left out keeps its
//! default. Command-line flags are applied on top by `main`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Invalid or unreadable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("tick_rate {value} is too low for a representable tick duration")]
    TickRateTooLow { value: f64 },
}

/// Runtime settings for the tick loop and the demo world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    pub arena_width: f32,
    pub arena_height: f32,
    /// Balls spawned at start.
    pub ball_count: usize,
    /// How many ticks a spark lives after a bounce.
    pub spark_lifetime_ticks: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 600,
            arena_width: 320.0,
            arena_height: 180.0,
            ball_count: 8,
            spark_lifetime_ticks: 12,
        }
    }
}

impl AppConfig {
    /// Loads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] or [`ConfigError::Parse`] if the file cannot be
    /// read or is not a valid config document.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Checks that rates and dimensions are usable.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotPositive`] for the first non-positive field,
    /// [`ConfigError::TickRateTooLow`] if one tick would last longer than a
    /// [`Duration`] can hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("tick_rate", self.tick_rate),
            ("arena_width", f64::from(self.arena_width)),
            ("arena_height", f64::from(self.arena_height)),
            ("spark_lifetime_ticks", f64::from(self.spark_lifetime_ticks)),
        ];
        for (field, value) in checks {
            // Written as a negated comparison so NaN is rejected too.
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if Duration::try_from_secs_f64(1.0 / self.tick_rate).is_err() {
            return Err(ConfigError::TickRateTooLow {
                value: self.tick_rate,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.max_ticks, 600);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "ball_count": 3, "max_ticks": 10 }"#).unwrap();
        assert_eq!(config.ball_count, 3);
        assert_eq!(config.max_ticks, 10);
        assert_eq!(config.tick_rate, AppConfig::default().tick_rate);
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let config = AppConfig {
            tick_rate: 0.0,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "tick_rate must be positive, got 0");
    }

    #[test]
    fn test_tiny_tick_rate_rejected() {
        let config = AppConfig {
            tick_rate: 1e-30,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TickRateTooLow { .. })
        ));

        let slow = AppConfig {
            tick_rate: 0.001,
            ..AppConfig::default()
        };
        assert!(slow.validate().is_ok());
    }

    #[test]
    fn test_nan_dimension_rejected() {
        let config = AppConfig {
            arena_width: f32::NAN,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "arena_width",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/pattern.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("pattern_app_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "tick_rate": 30.0, "arena_width": 100.0 }"#).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.arena_width, 100.0);
        assert_eq!(config.ball_count, AppConfig::default().ball_count);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("pattern_app_bad_{}.json", std::process::id()));
        std::fs::write(&path, "{ tick_rate: ").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
