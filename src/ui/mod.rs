//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `scripted` - Deterministic prompt answers for tests
//! - This module - The [Prompter] seam and its terminal implementation

use std::io::IsTerminal;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};

use crate::error::{DeployError, Result};

pub mod formatter;
pub mod scripted;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_header, display_status, display_success,
};
pub use scripted::{Answer, ScriptedPrompter};

/// Source of operator decisions.
///
/// The workflow never reads stdin directly; it asks a `Prompter`, so tests
/// can supply scripted answers.
pub trait Prompter {
    /// Ask a yes/no question. `default` is used when the operator just presses Enter.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Pick one of `items`, returning its index. `default` is pre-selected.
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;
}

/// Prompts on the controlling terminal.
///
/// Escape or Ctrl-C on a prompt is treated as [DeployError::Aborted].
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter {
            theme: ColorfulTheme::default(),
        }
    }

    fn ensure_interactive() -> Result<()> {
        if std::io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(DeployError::prompt("stdin is not a terminal"))
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn dialog_error(e: dialoguer::Error) -> DeployError {
    match e {
        dialoguer::Error::IO(io_err) => DeployError::Io(io_err),
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Self::ensure_interactive()?;

        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map_err(dialog_error)?
            .ok_or(DeployError::Aborted)
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        if items.is_empty() {
            return Err(DeployError::prompt(format!("nothing to select for '{}'", prompt)));
        }
        if items.len() == 1 {
            return Ok(0);
        }
        Self::ensure_interactive()?;

        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default.min(items.len() - 1))
            .interact_opt()
            .map_err(dialog_error)?
            .ok_or(DeployError::Aborted)
    }
}
