//! Dispatch context: grid topology, optimization parameters and the
//! chronics of the scenario being dispatched.

pub mod context;
pub mod grid;

pub use context::{DispatchEnvironment, Dispatcher, RenewableKind, ScenarioContext};
pub use grid::{Generator, GridTopology};
