//! Encode command - print directory-grouped file lists

use crate::cli::args::EncodeArgs;
use crate::encode::{encode_files, DirectoryGroup};
use crate::error::RepoCacheResult;
use crate::ingest::read_packages;
use std::collections::BTreeMap;
use tracing::warn;

/// Execute the encode command
pub fn execute(args: EncodeArgs) -> RepoCacheResult<()> {
    let input = read_packages(&args.input)?;
    if input.skipped > 0 {
        warn!("{} input line(s) skipped", input.skipped);
    }

    let encoded: BTreeMap<&str, BTreeMap<String, DirectoryGroup>> = input
        .packages
        .iter()
        .map(|p| (p.pkg_id.as_str(), encode_files(&p.files)))
        .collect();

    println!("{}", serde_json::to_string_pretty(&encoded)?);
    Ok(())
}
