use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How long each cue keeps the output ducked, in seconds
pub const DEFAULT_DUCK_WINDOW_SECS: f64 = 1.0;
/// Output level while a cue is active
pub const DEFAULT_DUCKED_VOLUME: f32 = 0.2;
/// Output level when no cue is active
pub const FULL_VOLUME: f32 = 1.0;
/// Typical HTML media `timeupdate` cadence
pub const DEFAULT_TICK_RATE_HZ: f64 = 4.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("duck window must be a positive number of seconds, got {0}")]
    InvalidWindow(f64),

    #[error("ducked volume must be within [0, 1], got {0}")]
    InvalidVolume(f32),

    #[error("tick rate must be positive, got {0}")]
    InvalidTickRate(f64),

    #[error("loop count must be at least 1")]
    InvalidLoopCount,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ducking: DuckingConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct DuckingConfig {
    pub window_secs: f64,
    pub ducked_volume: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    pub tick_rate_hz: f64,
    pub loop_count: u32,
}

impl Default for DuckingConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_DUCK_WINDOW_SECS,
            ducked_volume: DEFAULT_DUCKED_VOLUME,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            loop_count: 1,
        }
    }
}

impl DuckingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.window_secs.is_finite() || self.window_secs <= 0.0 {
            return Err(ConfigError::InvalidWindow(self.window_secs));
        }
        if !(0.0..=1.0).contains(&self.ducked_volume) {
            return Err(ConfigError::InvalidVolume(self.ducked_volume));
        }
        Ok(())
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate(self.tick_rate_hz));
        }
        if self.loop_count == 0 {
            return Err(ConfigError::InvalidLoopCount);
        }
        Ok(())
    }
}

/// `CUE_SYNC_` variables, `__` between nested keys
/// (e.g. `CUE_SYNC_DUCKING__WINDOW_SECS=0.8`)
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix("CUE_SYNC")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    /// Load `cue-sync.toml` from the working directory (if present) and
    /// `CUE_SYNC_` environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = Self::read_from(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, the file and the environment without checking the
    /// result, so callers can apply their own overrides before validating.
    pub fn read_from(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::read_layers(path, env_overrides())
    }

    fn read_layers(path: Option<&Path>, env: config::Environment) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("ducking.window_secs", DEFAULT_DUCK_WINDOW_SECS)?
            .set_default("ducking.ducked_volume", DEFAULT_DUCKED_VOLUME as f64)?
            .set_default("playback.tick_rate_hz", DEFAULT_TICK_RATE_HZ)?
            .set_default("playback.loop_count", 1)?;

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("cue-sync").required(false)),
        };

        Ok(builder.add_source(env).build()?.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ducking.validate()?;
        self.playback.validate()
    }

    /// Effective configuration as TOML, for `--print-config`
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
