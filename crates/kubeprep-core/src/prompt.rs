//! Operator prompt capability
//!
//! Workflow code never talks to a terminal directly. It asks a [`Prompter`]
//! for a selection, a line of text or a confirmation; in batch mode the
//! [`BatchPrompter`] answers every question with its default so the same
//! code path runs unattended.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Minimal prompt capability used by the bootstrap and context workflows
pub trait Prompter: Send + Sync {
    /// Whether this prompter answers without an operator
    fn is_batch(&self) -> bool;

    /// Pick one of `options`; `None` when there is nothing to pick
    fn select(&self, message: &str, options: &[String], default: Option<&str>)
        -> Result<Option<String>>;

    /// Ask for free text
    fn input(&self, message: &str, default: &str) -> Result<String>;

    /// Ask a yes/no question
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Non-interactive prompter: every answer is the supplied default
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchPrompter;

impl Prompter for BatchPrompter {
    fn is_batch(&self) -> bool {
        true
    }

    fn select(
        &self,
        _message: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(default
            .filter(|d| options.iter().any(|o| o == d))
            .map(str::to_string))
    }

    fn input(&self, _message: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn confirm(&self, _message: &str, default: bool) -> Result<bool> {
        Ok(default)
    }
}

/// One pre-recorded answer for a [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Answer to `select`
    Select(String),
    /// Answer to `input`
    Text(String),
    /// Answer to `confirm`
    Confirm(bool),
    /// Accept whatever default the question offers
    Default,
}

/// Interactive prompter that replays pre-recorded answers
///
/// Behaves like an operator at a terminal: `is_batch` is false and every
/// question consumes the next answer. Running out of answers is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    /// Create a prompter that will give `answers` in order
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Messages of every question asked so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn next(&self, message: &str) -> Result<Answer> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        self.answers
            .lock()
            .map_err(|_| Error::Prompt("answer queue poisoned".into()))?
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no scripted answer for: {message}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn is_batch(&self) -> bool {
        false
    }

    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<Option<String>> {
        match self.next(message)? {
            Answer::Select(choice) if options.contains(&choice) => Ok(Some(choice)),
            Answer::Select(choice) => Err(Error::invalid_argument(choice, options.to_vec())),
            Answer::Default => Ok(default.map(str::to_string)),
            other => Err(Error::Prompt(format!("expected a selection, got {other:?}"))),
        }
    }

    fn input(&self, message: &str, default: &str) -> Result<String> {
        match self.next(message)? {
            Answer::Text(text) => Ok(text),
            Answer::Default => Ok(default.to_string()),
            other => Err(Error::Prompt(format!("expected text, got {other:?}"))),
        }
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        match self.next(message)? {
            Answer::Confirm(yes) => Ok(yes),
            Answer::Default => Ok(default),
            other => Err(Error::Prompt(format!("expected a confirmation, got {other:?}"))),
        }
    }
}
