//! Build command - create or refresh a cache

use crate::cli::args::BuildArgs;
use crate::cli::commands::cache_path;
use crate::config::Config;
use crate::error::RepoCacheResult;
use crate::ingest::{build_cache, BuildReport, BuildRequest};
use crate::ui::{self, Mark, UiContext, WriteProgress};

/// Execute the build command
pub fn execute(args: BuildArgs, config: &Config) -> RepoCacheResult<()> {
    let ctx = UiContext::detect();
    let kind = args.target.kind;

    let request = BuildRequest {
        kind,
        db_path: cache_path(&args.target, config),
        input: args.target.input,
        prune: config.cache.prune_missing && !args.no_prune,
        force: args.force,
    };

    let progress = WriteProgress::new(&ctx, kind.file_prefix());
    let result = build_cache(&request, |p| {
        let label = p.package.name.as_deref().unwrap_or(&p.package.pkg_id);
        progress.update(p.position, p.total, label);
    });
    progress.finish();

    print_report(&ctx, &result?);
    Ok(())
}

fn print_report(ctx: &UiContext, report: &BuildReport) {
    let path = report.path.display().to_string();

    if !report.state.needs_write() {
        ui::step(ctx, Mark::Ok, "Cache is up to date", Some(&path));
        return;
    }

    ui::step(
        ctx,
        Mark::Ok,
        &format!("Cache built ({})", report.state),
        Some(&path),
    );
    ui::field(ctx, "written", &report.written.to_string(), None);
    if report.state.keeps_content() {
        ui::field(ctx, "unchanged", &report.unchanged.to_string(), None);
        ui::field(ctx, "removed", &report.removed.to_string(), None);
    }

    let problems = [
        (report.failed, "row(s) failed to write"),
        (report.skipped, "input line(s) skipped"),
    ];
    for (count, what) in problems {
        if count > 0 {
            ui::step(
                ctx,
                Mark::Warn,
                &format!("{} {}", count, what),
                Some("run with -v for details"),
            );
        }
    }
}
