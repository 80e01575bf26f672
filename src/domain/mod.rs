pub mod model;
pub mod phase;
pub mod ports;
pub mod row;

pub use model::*;
pub use phase::{Phase, PhaseStatus, Pipeline};
pub use ports::*;
pub use row::DetailRow;
