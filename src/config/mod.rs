#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, ImportTarget, LogFormat};
pub use settings::{Settings, SettingsOverrides};
pub use toml_config::TomlConfig;
