//! Styled line output
//!
//! Interactive terminals get glyph markers; CI logs get bracketed tags that
//! stay greppable once colors are stripped.

use super::context::UiContext;
use console::{style, Style};

/// Marker printed in front of a step line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Ok,
    Warn,
    Info,
}

impl Mark {
    fn glyph(self) -> &'static str {
        match self {
            Self::Ok => "◆",
            Self::Warn => "▲",
            Self::Info => "●",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Ok => "[OK]",
            Self::Warn => "[WARN]",
            Self::Info => "[INFO]",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::Ok => Style::new().green(),
            Self::Warn => Style::new().yellow(),
            Self::Info => Style::new().cyan(),
        }
    }

    fn render(self, ctx: &UiContext) -> String {
        let text = if ctx.use_fancy_output() {
            self.glyph()
        } else {
            self.tag()
        };
        self.style().apply_to(text).to_string()
    }
}

/// Format a step line without printing it
pub fn format_step(ctx: &UiContext, mark: Mark, message: &str, detail: Option<&str>) -> String {
    let mut line = format!("  {} {}", mark.render(ctx), message);
    if let Some(detail) = detail {
        let detail = if ctx.use_fancy_output() {
            style(detail).dim().to_string()
        } else {
            detail.to_string()
        };
        line.push_str(&format!(" ({})", detail));
    }
    line
}

/// Print a marked step line
pub fn step(ctx: &UiContext, mark: Mark, message: &str, detail: Option<&str>) {
    println!("{}", format_step(ctx, mark, message, detail));
}

/// Print a bold section title
pub fn title(ctx: &UiContext, text: &str) {
    println!("{}", style(text).cyan().bold());
    if !ctx.use_fancy_output() {
        println!();
    }
}

/// Print an aligned `key: value` line; `ok` colors the value when given
pub fn field(ctx: &UiContext, key: &str, value: &str, ok: Option<bool>) {
    let value = match ok {
        Some(true) => style(value).green().to_string(),
        Some(false) => style(value).yellow().to_string(),
        None => value.to_string(),
    };
    let key = format!("{:<10}", format!("{}:", key));
    if ctx.use_fancy_output() {
        println!("    {} {}", style(key).dim(), value);
    } else {
        println!("    {} {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_step_uses_tags() {
        let ctx = UiContext::non_interactive();
        console::set_colors_enabled(false);

        assert_eq!(
            format_step(&ctx, Mark::Ok, "Cache built", Some("/tmp/p.sqlite")),
            "  [OK] Cache built (/tmp/p.sqlite)"
        );
        assert_eq!(
            format_step(&ctx, Mark::Warn, "2 input line(s) skipped", None),
            "  [WARN] 2 input line(s) skipped"
        );
    }

    #[test]
    fn output_non_interactive() {
        let ctx = UiContext::non_interactive();
        // These should not panic
        title(&ctx, "Cache Status");
        step(&ctx, Mark::Info, "nothing to do", None);
        field(&ctx, "state", "fresh", Some(true));
    }
}
