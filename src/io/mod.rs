//! Reading and writing chronics tables.

pub mod export;
pub mod import;
