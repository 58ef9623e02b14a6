//! Application-level configuration.
//!
//! - [`ExecutionParams`]: agent loop control (step limit, tool timeout)

pub mod execution_params;

pub use execution_params::ExecutionParams;
