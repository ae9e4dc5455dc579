pub mod artifacts;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod coordinates;
pub mod description;
pub mod detection;
pub mod error;
pub mod imaging;
pub mod object_types;
pub mod pipeline;
pub mod server;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used items
pub use config::Config;
pub use coordinates::{parse_coordinates, Coordinates};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{DescriptionResult, Pipeline};
