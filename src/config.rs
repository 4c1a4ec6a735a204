//! Tunables for the search, burn execution and descent loops.
//!
//! Every field has a default matching flight-proven values, so a TOML file
//! only needs to name what it changes:
//!
//! ```toml
//! [search]
//! step_sizes = [100.0, 10.0, 1.0, 0.1]
//!
//! [descent]
//! clamp_throttle = true
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuidanceConfig {
    pub search: SearchConfig,
    pub executor: ExecutorConfig,
    pub descent: DescentConfig,
    pub sim: SimConfig,
}

/// Parameters shared by the planner's searches.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Pattern-search step sizes, strictly decreasing.
    pub step_sizes: Vec<f64>,
    /// Candidates whose epoch is closer than this to "now" score the sentinel, s.
    pub staleness_margin: f64,
    /// Bracket width at which the ternary search stops, s.
    pub time_tolerance: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Steering is locked this long before ignition, s.
    pub warmup: f64,
    /// Period of the burn control loop, s.
    pub control_step: f64,
    /// Thrust drop that counts as a flameout for auto-staging, N.
    pub stage_thrust_drop: f64,
    /// Pause after staging before thrust is sampled again, s.
    pub stage_settle: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DescentConfig {
    /// Height of the lowest point of the vessel above its reference point, m.
    pub ground_clearance: f64,
    /// Distance to ground below which the landing gear is deployed, m.
    pub gear_altitude: f64,
    /// Time the terrain-normal attitude is held after touchdown, s.
    pub settle_time: f64,
    /// Period of the descent control loop, s.
    pub control_step: f64,
    /// Horizontal offset of the three terrain samples around the vessel, m.
    pub terrain_sample_radius: f64,
    /// Saturate the commanded throttle at 1.0.
    pub clamp_throttle: bool,
}

/// Settings of the simulated vessel used by the demo scenarios.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Samples along a post-node trajectory when predicting an encounter.
    pub encounter_samples: usize,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            executor: ExecutorConfig::default(),
            descent: DescentConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step_sizes: vec![100.0, 10.0, 1.0],
            staleness_margin: 15.0,
            time_tolerance: 1.0,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            warmup: 10.0,
            control_step: 0.05,
            stage_thrust_drop: 10.0,
            stage_settle: 1.0,
        }
    }
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            ground_clearance: 5.0,
            gear_altitude: 500.0,
            settle_time: 5.0,
            control_step: 0.05,
            terrain_sample_radius: 5.0,
            clamp_throttle: false,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { encounter_samples: 256 }
    }
}

impl GuidanceConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GuidanceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let steps = &self.search.step_sizes;
        if steps.is_empty() {
            return Err(ConfigError::Invalid("search.step_sizes is empty".into()));
        }
        if steps.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::Invalid(
                "search.step_sizes must be positive".into(),
            ));
        }
        if steps.windows(2).any(|w| w[1] >= w[0]) {
            return Err(ConfigError::Invalid(
                "search.step_sizes must be strictly decreasing".into(),
            ));
        }
        if self.sim.encounter_samples < 2 {
            return Err(ConfigError::Invalid(
                "sim.encounter_samples must be at least 2".into(),
            ));
        }

        let positive = [
            ("search.time_tolerance", self.search.time_tolerance),
            ("executor.control_step", self.executor.control_step),
            ("descent.control_step", self.descent.control_step),
            ("descent.terrain_sample_radius", self.descent.terrain_sample_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be > 0, got {value}")));
            }
        }

        let non_negative = [
            ("search.staleness_margin", self.search.staleness_margin),
            ("executor.warmup", self.executor.warmup),
            ("executor.stage_thrust_drop", self.executor.stage_thrust_drop),
            ("executor.stage_settle", self.executor.stage_settle),
            ("descent.ground_clearance", self.descent.ground_clearance),
            ("descent.gear_altitude", self.descent.gear_altitude),
            ("descent.settle_time", self.descent.settle_time),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = GuidanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.step_sizes, vec![100.0, 10.0, 1.0]);
        assert_eq!(config.search.staleness_margin, 15.0);
        assert_eq!(config.executor.warmup, 10.0);
        assert_eq!(config.descent.gear_altitude, 500.0);
        assert!(!config.descent.clamp_throttle);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GuidanceConfig::from_toml_str(
            "[search]\nstep_sizes = [50.0, 5.0, 0.5]\n\n[descent]\nclamp_throttle = true\n",
        )
        .unwrap();
        assert_eq!(config.search.step_sizes, vec![50.0, 5.0, 0.5]);
        assert_eq!(config.search.staleness_margin, 15.0);
        assert!(config.descent.clamp_throttle);
        assert_eq!(config.executor, ExecutorConfig::default());
    }

    #[test]
    fn rejects_non_decreasing_steps() {
        let err = GuidanceConfig::from_toml_str("[search]\nstep_sizes = [1.0, 10.0]\n");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_control_step() {
        let err = GuidanceConfig::from_toml_str("[executor]\ncontrol_step = 0.0\n");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn encounter_sampling_is_a_sim_setting() {
        let config = GuidanceConfig::from_toml_str("[sim]\nencounter_samples = 64\n").unwrap();
        assert_eq!(config.sim.encounter_samples, 64);
        assert_eq!(config.search, SearchConfig::default());

        let err = GuidanceConfig::from_toml_str("[sim]\nencounter_samples = 1\n");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[executor]\nwarmup = 20.0").unwrap();
        let config = GuidanceConfig::load(file.path()).unwrap();
        assert_eq!(config.executor.warmup, 20.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GuidanceConfig::load("/nonexistent/guidance.toml");
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
