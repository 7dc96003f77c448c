use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default logical grid width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 11;

/// Default logical grid height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 11;

/// Interval between simulation steps at the start of a round.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;

/// Multiplier applied to the step interval each time food is eaten.
pub const DEFAULT_SPEED_FACTOR: f64 = 0.9;

/// Hard lower bound keeping the step interval positive.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

const APP_DIR_NAME: &str = "torus-snake";
const LOG_FILE_NAME: &str = "torus-snake.log";

/// Tunable round behaviour.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoundConfig {
    /// End the round when the head runs into the body.
    pub enable_self_collision: bool,
    pub initial_speed_ms: u64,
    pub speed_factor: f64,
    /// Optional floor for the step interval; unset means only the
    /// one-millisecond hard minimum applies.
    pub min_speed_ms: Option<u64>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            enable_self_collision: true,
            initial_speed_ms: DEFAULT_TICK_INTERVAL_MS,
            speed_factor: DEFAULT_SPEED_FACTOR,
            min_speed_ms: None,
        }
    }
}

impl RoundConfig {
    #[must_use]
    pub fn initial_speed(&self) -> Duration {
        Duration::from_millis(self.initial_speed_ms).max(MIN_TICK_INTERVAL)
    }

    /// Returns the interval after one more food, clamped to the floor.
    #[must_use]
    pub fn accelerate(&self, speed: Duration) -> Duration {
        let floor = self
            .min_speed_ms
            .map_or(MIN_TICK_INTERVAL, Duration::from_millis)
            .max(MIN_TICK_INTERVAL);
        speed.mul_f64(self.speed_factor).max(floor)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(self.speed_factor > 0.0 && self.speed_factor <= 1.0) {
            return Err(ConfigError::SpeedFactor(self.speed_factor));
        }
        Ok(self)
    }
}

/// Failure to load a [`RoundConfig`] file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("speed_factor must be in (0, 1], got {0}")]
    SpeedFactor(f64),
}

/// Loads a JSON round config.
pub fn load_round_config(path: &Path) -> Result<RoundConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_round_config(&raw).map_err(|error| match error {
        ConfigError::Parse { source, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

fn parse_round_config(raw: &str) -> Result<RoundConfig, ConfigError> {
    serde_json::from_str::<RoundConfig>(raw)
        .map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?
        .validate()
}

/// Returns the platform-correct default log file path.
#[must_use]
pub fn default_log_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(LOG_FILE_NAME);
    base
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{ConfigError, RoundConfig, load_round_config, parse_round_config};

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse_round_config("{}").expect("empty config should parse");
        assert_eq!(config, RoundConfig::default());
        assert!(config.enable_self_collision);
        assert_eq!(config.initial_speed(), Duration::from_millis(500));
    }

    #[test]
    fn partial_config_overrides_listed_keys() {
        let config = parse_round_config(r#"{ "enable_self_collision": false, "min_speed_ms": 80 }"#)
            .expect("partial config should parse");

        assert!(!config.enable_self_collision);
        assert_eq!(config.min_speed_ms, Some(80));
        assert_eq!(config.initial_speed_ms, 500);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            parse_round_config(r#"{ "speed": 3 }"#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn out_of_range_speed_factor_is_rejected() {
        assert!(matches!(
            parse_round_config(r#"{ "speed_factor": 1.5 }"#),
            Err(ConfigError::SpeedFactor(_))
        ));
    }

    #[test]
    fn accelerate_shrinks_until_floor() {
        let config = RoundConfig {
            min_speed_ms: Some(400),
            ..RoundConfig::default()
        };

        let once = config.accelerate(config.initial_speed());
        assert_eq!(once, Duration::from_millis(450));
        let twice = config.accelerate(once);
        assert!(twice > Duration::from_millis(404) && twice < Duration::from_millis(406));
        assert_eq!(
            config.accelerate(Duration::from_millis(405)),
            Duration::from_millis(400)
        );
    }

    #[test]
    fn speed_never_reaches_zero_without_floor() {
        let config = RoundConfig::default();
        let mut speed = config.initial_speed();
        for _ in 0..500 {
            speed = config.accelerate(speed);
        }
        assert!(speed > Duration::ZERO);
    }

    #[test]
    fn missing_file_reports_path() {
        let path = unique_test_path("missing");
        let error = load_round_config(&path).expect_err("missing file should fail");

        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn config_file_round_trip() {
        let path = unique_test_path("load");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(&path, r#"{ "initial_speed_ms": 250 }"#).expect("test file write should succeed");

        let config = load_round_config(&path).expect("config should load");
        assert_eq!(config.initial_speed(), Duration::from_millis(250));

        let _ = fs::remove_file(&path);
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("torus-snake-config-tests")
            .join(format!("{label}-{nanos}.json"))
    }
}
