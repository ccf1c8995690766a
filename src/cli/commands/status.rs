//! Status command - report a cache's state against its input

use crate::cache::{probe, CacheIdentity, CacheState};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::commands::cache_path;
use crate::config::Config;
use crate::error::RepoCacheResult;
use crate::schema::SchemaKind;
use crate::ui::{self, UiContext};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct CacheStatus {
    kind: SchemaKind,
    path: PathBuf,
    state: CacheState,
    version: i64,
    checksum: String,
}

/// Execute the status command
pub fn execute(args: StatusArgs, config: &Config) -> RepoCacheResult<()> {
    let path = cache_path(&args.target, config);
    let identity = CacheIdentity::for_source(&args.target.input)?;
    let state = probe(&path, &identity)?;

    let status = CacheStatus {
        kind: args.target.kind,
        path,
        state,
        version: identity.version,
        checksum: identity.checksum,
    };

    match args.format {
        OutputFormat::Table => print_table(&status),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Plain => println!("{}", status.state),
    }

    Ok(())
}

fn print_table(status: &CacheStatus) {
    let ctx = UiContext::detect();
    ui::title(&ctx, "Cache Status");

    ui::field(&ctx, "kind", status.kind.file_prefix(), None);
    ui::field(&ctx, "path", &status.path.display().to_string(), None);
    ui::field(
        &ctx,
        "state",
        &status.state.to_string(),
        Some(status.state == CacheState::Fresh),
    );
    ui::field(&ctx, "version", &status.version.to_string(), None);
    ui::field(&ctx, "checksum", &status.checksum, None);
}
