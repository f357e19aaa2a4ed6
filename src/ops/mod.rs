//! Array operations.

pub mod set;
