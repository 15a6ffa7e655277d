//! Subcommand implementations. Each module owns its clap arguments.

pub mod completions;
pub mod members;
pub mod merge;
pub mod place;
pub mod tracked;

use std::path::Path;

use anyhow::{Context, Result};
use jregen::config::JregenConfig;

/// Load the explicit config file, or `<root>/.jregen/config.toml`.
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<JregenConfig> {
    let path = explicit.map_or_else(|| JregenConfig::default_path(root), Path::to_path_buf);
    JregenConfig::load(&path).with_context(|| format!("loading configuration from {}", path.display()))
}
