use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{DeployError, Result};
use crate::ui::Prompter;

/// A queued answer for [ScriptedPrompter].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    Yes,
    No,
    /// Accept whatever default the prompt offers
    Default,
    Pick(usize),
}

/// Prompter answering from a script, for tests and non-interactive runs.
///
/// Every prompt text is recorded. With [ScriptedPrompter::declining] every
/// confirmation is answered "no" and every selection takes its default.
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    decline_when_empty: bool,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    /// Answer prompts in order from `answers`; running out is an error
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedPrompter {
            answers: RefCell::new(answers.into_iter().collect()),
            decline_when_empty: false,
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Say "no" to every confirmation and take the default of every selection
    pub fn declining() -> Self {
        ScriptedPrompter {
            answers: RefCell::new(VecDeque::new()),
            decline_when_empty: true,
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Prompts asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn next(&self, prompt: &str) -> Result<Option<Answer>> {
        self.asked.borrow_mut().push(prompt.to_string());
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => Ok(Some(answer)),
            None if self.decline_when_empty => Ok(None),
            None => Err(DeployError::prompt(format!(
                "no scripted answer for '{}'",
                prompt
            ))),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt)? {
            None => Ok(false),
            Some(Answer::Yes) => Ok(true),
            Some(Answer::No) => Ok(false),
            Some(Answer::Default) => Ok(default),
            Some(Answer::Pick(_)) => Err(DeployError::prompt(format!(
                "selection scripted for confirmation '{}'",
                prompt
            ))),
        }
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        let index = match self.next(prompt)? {
            None | Some(Answer::Default) => default,
            Some(Answer::Pick(index)) => index,
            Some(answer) => {
                return Err(DeployError::prompt(format!(
                    "{:?} scripted for selection '{}'",
                    answer, prompt
                )))
            }
        };

        if index >= items.len() {
            return Err(DeployError::prompt(format!(
                "selection {} out of range for '{}'",
                index, prompt
            )));
        }
        Ok(index)
    }
}
