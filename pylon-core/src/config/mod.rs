//! Configuration types
//!
//! Machine constants parsed from TOML, and the settings blob format the
//! external storage service persists.

pub mod delta;
#[cfg(feature = "serde")]
pub mod settings;
pub mod toml;

pub use delta::{DeltaConfig, ProbeConfig};
#[cfg(feature = "serde")]
pub use settings::{DeltaSettings, SettingsError};
pub use toml::{parse_config, ParseError};
