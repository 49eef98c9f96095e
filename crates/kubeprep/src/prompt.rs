//! Terminal prompter backed by dialoguer

use dialoguer::{Confirm, Input, Select};
use kubeprep_core::{Error, Prompter, Result};

/// Asks the operator at the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(e.to_string())
}

impl Prompter for TerminalPrompter {
    fn is_batch(&self) -> bool {
        false
    }

    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<Option<String>> {
        if options.is_empty() {
            return Ok(None);
        }
        let default = default
            .and_then(|d| options.iter().position(|o| o == d))
            .unwrap_or(0);

        let selection = Select::new()
            .with_prompt(message)
            .items(options)
            .default(default)
            .interact_opt()
            .map_err(prompt_error)?;
        Ok(selection.and_then(|i| options.get(i).cloned()))
    }

    fn input(&self, message: &str, default: &str) -> Result<String> {
        let mut input = Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }
}
