//! Tool catalogue and toolset enablement

pub mod manager;

pub use manager::{TOOLSET_ENABLE, ToolManager};
