//! Utility modules

pub mod coerce;
pub mod memory_lookup;
pub mod validation;

pub use memory_lookup::*;
pub use validation::*;
