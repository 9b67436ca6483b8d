//! UI layer: terminal prompts, alerts, and navigation for the CLI.

pub mod login_screen;
pub mod navigator;
pub mod terminal;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
