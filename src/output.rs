//! # Output Configuration & Reporting
//!
//! This module controls CLI output appearance and renders the core status
//! types into human-readable text.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Rendering
//!
//! [`render_repository_status`] produces the familiar three-section status
//! listing (staged, not staged, untracked); [`render_submodule_report`]
//! produces one line per submodule describing where its checkout stands
//! relative to the recorded pin and the expected branch.

use std::env;

use console::Style;

use crate::status::{FileChangeKind, RepositoryStatus};
use crate::submodule::{AncestryVerdict, SubmoduleReport, SubmoduleSnapshot};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// # Behavior
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        // Use console crate's detection for TTY and color support
        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Apply `style` to `text` when colors are enabled, pass it through
/// unchanged otherwise.
pub fn paint(config: &OutputConfig, text: &str, style: Style) -> String {
    if config.use_color {
        style.apply_to(text).force_styling(true).to_string()
    } else {
        text.to_string()
    }
}

fn change_label(kind: FileChangeKind) -> &'static str {
    match kind {
        FileChangeKind::Modified => "modified:",
        FileChangeKind::Added => "new file:",
        FileChangeKind::Removed => "deleted:",
        FileChangeKind::Conflicted => "conflicted:",
        FileChangeKind::Renamed => "renamed:",
        FileChangeKind::TypeChanged => "typechange:",
    }
}

/// Render one repository's status as a multi-line listing.
pub fn render_repository_status(config: &OutputConfig, status: &RepositoryStatus) -> String {
    let mut out = String::new();

    match (&status.current_branch, &status.head_commit) {
        (Some(branch), Some(head)) => {
            out.push_str(&format!("On branch {} at {}\n", branch, head.short()));
        }
        (Some(branch), None) => {
            out.push_str(&format!("On branch {} (no commits yet)\n", branch));
        }
        (None, Some(head)) => {
            out.push_str(&format!("HEAD detached at {}\n", head.short()));
        }
        (None, None) => out.push_str("No branch, no commits\n"),
    }

    if !status.staged.is_empty() {
        out.push_str("\nChanges to be committed:\n");
        for (path, kind) in &status.staged {
            let line = format!("  {:<12}{}", change_label(*kind), path.display());
            out.push_str(&paint(config, &line, Style::new().green()));
            out.push('\n');
        }
    }

    if !status.working_dir.is_empty() {
        out.push_str("\nChanges not staged for commit:\n");
        for (path, kind) in &status.working_dir {
            let line = format!("  {:<12}{}", change_label(*kind), path.display());
            out.push_str(&paint(config, &line, Style::new().red()));
            out.push('\n');
        }
    }

    if !status.untracked.is_empty() {
        out.push_str("\nUntracked files:\n");
        for path in &status.untracked {
            let line = format!("  {}", path.display());
            out.push_str(&paint(config, &line, Style::new().red()));
            out.push('\n');
        }
    }

    if status.is_clean() && status.untracked.is_empty() {
        out.push_str("\nnothing to commit, working tree clean\n");
    }

    out
}

/// Render one submodule report as a single line.
///
/// `expected_branch` is the branch the meta-repository is on; a submodule
/// checked out on a different branch is annotated, though that alone is not
/// a gate violation.
pub fn render_submodule_report(
    config: &OutputConfig,
    report: &SubmoduleReport,
    expected_branch: Option<&str>,
) -> String {
    let prefix = format!("* {} {}", report.pin.name, report.pin.pinned.short());

    match &report.result {
        Err(e) => {
            let msg = format!("status query failed: {e}");
            format!("{}: {}", prefix, paint(config, &msg, Style::new().red()))
        }
        Ok(SubmoduleSnapshot::NotVisible) => format!(
            "{}: {}",
            prefix,
            paint(config, "not checked out", Style::new().yellow())
        ),
        Ok(SubmoduleSnapshot::Present { status, ancestry }) => {
            let branch = match (&status.current_branch, expected_branch) {
                (Some(b), Some(expected)) if b != expected => {
                    format!("{b}; expected {expected}")
                }
                (Some(b), _) => b.clone(),
                (None, _) => "detached".to_string(),
            };

            let mut states = Vec::new();
            match ancestry {
                None => {}
                Some(AncestryVerdict::Advanced) => {
                    let at = status
                        .head_commit
                        .as_ref()
                        .map(|h| h.short().to_string())
                        .unwrap_or_default();
                    states.push(format!("has new commits (at {at})"));
                }
                Some(AncestryVerdict::Diverged) => {
                    states.push("not a descendant of the recorded commit".to_string());
                }
            }
            if !status.is_clean() {
                states.push("uncommitted changes".to_string());
            }

            let (text, style) = if states.is_empty() {
                ("clean".to_string(), Style::new().green())
            } else {
                (states.join(", "), Style::new().red())
            };
            format!("{} ({}): {}", prefix, branch, paint(config, &text, style))
        }
    }
}
