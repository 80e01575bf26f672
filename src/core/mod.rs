pub mod client;
pub mod data_import;
pub mod debounce;
pub mod http;
pub mod statistics;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::ports::{
    ConfigProvider, DataImportBackend, DetailQuery, MigrationBackend, Prompter, Storage,
};
pub use crate::utils::error::Result;
pub use client::MigrationClient;
pub use data_import::DataImportClient;
pub use debounce::{debounce, DebounceHandle, Debouncer};
pub use statistics::{AutoRefresh, StatisticsCache};
