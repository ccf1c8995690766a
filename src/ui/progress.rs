//! Progress indicators with CI fallback

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar for the package write loop.
///
/// Shows an indicatif bar in interactive mode and stays silent in CI, where
/// the final report is enough.
pub struct WriteProgress {
    bar: Option<ProgressBar>,
}

impl WriteProgress {
    pub fn new(ctx: &UiContext, label: &str) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(0);
            let template = ProgressStyle::with_template(
                "  {spinner:.cyan} Writing {prefix}  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(
                template
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };
        Self { bar }
    }

    /// Advance to `position` of `total`, showing `name` as the message
    pub fn update(&self, position: usize, total: usize, name: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_length(total as u64);
            bar.set_position(position as u64);
            bar.set_message(name.to_string());
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
