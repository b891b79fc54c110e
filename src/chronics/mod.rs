//! Chronics data model: time-indexed stage outputs and static element
//! characteristics.

pub mod characteristics;
pub mod table;

pub use characteristics::CharacteristicsTable;
pub use table::{TableError, TimeSeriesTable};
