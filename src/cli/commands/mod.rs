//! CLI command implementations

pub mod build;
pub mod config;
pub mod encode;
pub mod status;

pub use build::execute as build;
pub use config::execute as config;
pub use encode::execute as encode;
pub use status::execute as status;

use crate::cache::db_filename;
use crate::cli::args::TargetArgs;
use crate::config::{Config, ConfigManager};
use std::path::PathBuf;

/// Store path for a target: `<prefix>.sqlite`, or `<cache dir>/<kind>.sqlite`
pub(crate) fn cache_path(target: &TargetArgs, config: &Config) -> PathBuf {
    match target.prefix {
        Some(ref prefix) => db_filename(prefix),
        None => {
            let dir = config
                .cache
                .dir
                .clone()
                .unwrap_or_else(ConfigManager::default_cache_dir);
            db_filename(dir.join(target.kind.file_prefix()))
        }
    }
}
