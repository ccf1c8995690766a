//! Interactive vs CI detection

use std::io::IsTerminal;

/// Environment variables set by common CI systems
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// Decides between decorated and plain output
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Interactive when stdout is a terminal and no CI variable is set
    pub fn detect() -> Self {
        let in_ci = running_in_ci(|var| std::env::var_os(var).is_some());
        Self {
            interactive: std::io::stdout().is_terminal() && !in_ci,
        }
    }

    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Progress bars, glyphs and dimmed details
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}

fn running_in_ci(is_set: impl Fn(&str) -> bool) -> bool {
    CI_VARS.iter().any(|var| is_set(var))
}
