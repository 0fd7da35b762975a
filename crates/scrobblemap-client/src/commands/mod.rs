//! Command implementations.

pub mod config;
pub mod daily;
pub mod heatmap;

/// Printed when the fetch succeeded but produced no completed scrobbles.
pub const NO_SCROBBLES_MESSAGE: &str = "No scrobbles available to generate a heatmap.";
