pub mod config;
pub mod request;

pub use config::{
    AppConfig, DebounceConfig, ExportConfig, QuantizeConfig, MAX_QUIET_PERIOD_MS, MAX_SWATCH_SIZE,
};
pub use request::{ColorLimits, QuantizationRequest};
