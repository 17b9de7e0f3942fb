//! Configuration for the biome repaint service.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line via clap. Unknown fields are ignored and missing ones take
//! their defaults, so older and newer files both load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{BiomeDefinition, Config, DebugConfig, HostConfig, PainterConfig, SyncSettings};
pub use error::ConfigError;
