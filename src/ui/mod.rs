//! Terminal output for the CLI
//!
//! Styled output with `console` and progress bars with `indicatif`, falling
//! back to plain bracketed output in CI and non-interactive environments.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{field, format_step, step, title, Mark};
pub use progress::WriteProgress;
