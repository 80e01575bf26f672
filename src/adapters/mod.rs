// 對外部系統的具體實作：檔案存取與匯出

pub mod export;
pub mod storage;

pub use export::{export_rows, rows_to_csv};
pub use storage::LocalStorage;
