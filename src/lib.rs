pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::Settings;

pub use adapters::LocalStorage;
pub use app::{DetailTable, ImportBoard, PhaseBoard};
pub use core::{DataImportClient, MigrationClient, StatisticsCache};
pub use domain::{Phase, Pipeline};
pub use utils::error::{MigrationError, Result};
