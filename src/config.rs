use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use timer_core::{preset_index, Color, DEFAULT_PRESET_SECONDS, PRESET_SECONDS};

const APP_DIR: &str = "wavetimer";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "wavetimer.log";

pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const MAX_FRAME_RATE: u32 = 240;
pub const DEFAULT_COLOR: Color = Color::rgb(0xBB, 0x86, 0xFC);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("frame_rate must be between 1 and {max}, got {0}", max = MAX_FRAME_RATE)]
    FrameRate(u32),
    #[error("default_preset must be one of {presets:?}, got {0}", presets = PRESET_SECONDS)]
    Preset(u32),
    #[error("color must look like #RRGGBB, got {0:?}")]
    Color(String),
}

/// On-disk shape. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    frame_rate: Option<u32>,
    default_preset: Option<u32>,
    color: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub frame_rate: u32,
    pub default_preset: u32,
    pub color: Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            default_preset: DEFAULT_PRESET_SECONDS,
            color: DEFAULT_COLOR,
        }
    }
}

impl AppConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(rate) = raw.frame_rate {
            config.frame_rate = check_frame_rate(rate)?;
        }
        if let Some(preset) = raw.default_preset {
            config.default_preset = check_preset(preset)?;
        }
        if let Some(color) = raw.color {
            config.color = parse_hex_color(&color).ok_or(ConfigError::Color(color))?;
        }
        Ok(config)
    }

    /// Read the config file. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load settings, falling back to defaults when the file is unusable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            log::debug!("No config directory; using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    /// Apply command-line overrides. Invalid values are rejected, not clamped.
    pub fn apply_overrides(
        &mut self,
        frame_rate: Option<u32>,
        preset: Option<u32>,
    ) -> Result<(), ConfigError> {
        if let Some(rate) = frame_rate {
            self.frame_rate = check_frame_rate(rate)?;
        }
        if let Some(preset) = preset {
            self.default_preset = check_preset(preset)?;
        }
        Ok(())
    }

    pub fn frame_interval_ms(&self) -> u64 {
        (1000 / u64::from(self.frame_rate.max(1))).max(1)
    }
}

fn check_frame_rate(rate: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_FRAME_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::FrameRate(rate))
    }
}

fn check_preset(preset: u32) -> Result<u32, ConfigError> {
    preset_index(preset)
        .map(|_| preset)
        .ok_or(ConfigError::Preset(preset))
}

pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(APP_DIR).join(LOG_FILE))
}
