use crate::assets::AssetLoader;
use crate::models::{ColorLimits, QuantizationRequest};
use posterize::MAX_COLORS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted `export.swatch_size` in pixels
pub const MAX_SWATCH_SIZE: u32 = 256;

/// Largest accepted `debounce.quiet_period_ms`
pub const MAX_QUIET_PERIOD_MS: u64 = 10_000;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Color control defaults and range
    #[serde(default)]
    pub quantize: QuantizeConfig,

    /// Recompute scheduling
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Saved PNGs
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct QuantizeConfig {
    /// Color count for the first image of a session
    #[serde(default = "default_colors")]
    pub default_colors: u16,

    #[serde(default = "default_min_colors")]
    pub min_colors: u16,

    #[serde(default = "default_max_colors")]
    pub max_colors: u16,

    #[serde(default)]
    pub monochrome: bool,
}

fn default_colors() -> u16 {
    6
}

fn default_min_colors() -> u16 {
    2
}

fn default_max_colors() -> u16 {
    32
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            default_colors: default_colors(),
            min_colors: default_min_colors(),
            max_colors: default_max_colors(),
            monochrome: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DebounceConfig {
    /// Quiet period in milliseconds
    #[serde(default = "default_quiet_period")]
    pub quiet_period_ms: u64,
}

fn default_quiet_period() -> u64 {
    100
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExportConfig {
    /// Edge length of one palette swatch in pixels
    #[serde(default = "default_swatch_size")]
    pub swatch_size: u32,

    /// Re-compress saved PNGs with oxipng
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

fn default_swatch_size() -> u32 {
    64
}

fn default_optimize() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            swatch_size: default_swatch_size(),
            optimize: default_optimize(),
        }
    }
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        match loader.read_config_string() {
            Ok(content) => Self::from_yaml(&content),
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a YAML document; falls back to defaults on error
    pub fn from_yaml(content: &str) -> Self {
        match serde_yaml::from_str::<Self>(content) {
            Ok(config) => {
                let config = config.sanitized();
                tracing::debug!(
                    default_colors = config.quantize.default_colors,
                    min_colors = config.quantize.min_colors,
                    max_colors = config.quantize.max_colors,
                    quiet_period_ms = config.debounce.quiet_period_ms,
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Keep every value inside what the session and engine accept
    pub fn sanitized(mut self) -> Self {
        let q = &mut self.quantize;
        q.max_colors = q.max_colors.min(MAX_COLORS);
        q.min_colors = q.min_colors.clamp(default_min_colors(), q.max_colors.max(2));
        q.max_colors = q.max_colors.max(q.min_colors);
        q.default_colors = q.default_colors.clamp(q.min_colors, q.max_colors);
        self.export.swatch_size = self.export.swatch_size.clamp(1, MAX_SWATCH_SIZE);
        self.debounce.quiet_period_ms = self.debounce.quiet_period_ms.min(MAX_QUIET_PERIOD_MS);
        self
    }

    pub fn limits(&self) -> ColorLimits {
        ColorLimits {
            min: self.quantize.min_colors,
            max: self.quantize.max_colors,
        }
    }

    /// Request used before the user touched any control
    pub fn default_request(&self) -> QuantizationRequest {
        QuantizationRequest::new(self.quantize.default_colors, self.quantize.monochrome)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce.quiet_period_ms)
    }
}
