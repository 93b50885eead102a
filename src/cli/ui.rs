//! Shared prompt helpers
//!
//! Conventions:
//! - Prompts: lowercase with colon and space: `outcome: `
//! - Feedback: single word when possible: `Saved.`

use std::io::IsTerminal;

use anyhow::Result;
use inquire::{ui::RenderConfig, Confirm, Select};

/// True when both stdin and stdout are attached to a terminal.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Get a minimal render config for inquire prompts
pub fn minimal_render_config() -> RenderConfig<'static> {
    RenderConfig::default_colored()
        .with_prompt_prefix(inquire::ui::Styled::new(""))
        .with_answered_prompt_prefix(inquire::ui::Styled::new(""))
}

/// Display a selection menu and return the chosen index
pub fn select<T: ToString>(prompt: &str, options: &[T]) -> Result<Option<usize>> {
    if options.is_empty() {
        return Ok(None);
    }

    let items: Vec<String> = options.iter().map(|o| o.to_string()).collect();

    let result = Select::new(prompt, items.clone())
        .with_render_config(minimal_render_config())
        .with_vim_mode(true)
        .prompt_skippable()?;

    Ok(result.and_then(|selected| items.iter().position(|i| *i == selected)))
}

/// Prompt for yes/no confirmation (default: no)
pub fn confirm(prompt: &str) -> Result<bool> {
    let result = Confirm::new(prompt)
        .with_render_config(minimal_render_config())
        .with_default(false)
        .prompt()?;
    Ok(result)
}

/// Print a warning message to stderr
#[inline]
pub fn warning(msg: &str) {
    eprintln!("Warning: {}", msg);
}
