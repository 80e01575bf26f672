#[cfg(feature = "cli")]
pub mod console;
pub mod dashboard;
pub mod data_import;
pub mod details;
pub mod prompt;

pub use dashboard::{PhaseBoard, PhaseCard};
pub use data_import::{ImportBoard, ImportEntity, ImportLog, LogKind, OverallProgress};
pub use details::DetailTable;
pub use prompt::TerminalPrompter;
