//! Line-oriented prompting.
//!
//! [`validate`] is the pure check behind every question; [`Prompter`] is
//! the interactive loop around it, generic over its streams so whole
//! conversations can be scripted in tests.

use crate::error::{BikeshareError, Result};
use std::fmt::Display;
use std::io::{BufRead, Write};
use tracing::debug;

/// Match a free-text answer against the allowed values.
///
/// Surrounding whitespace and letter case are ignored.
pub fn validate<T: Copy + Display>(candidate: &str, allowed: &[T]) -> Result<T> {
    let normalized = candidate.trim().to_lowercase();
    allowed
        .iter()
        .copied()
        .find(|value| value.to_string().to_lowercase() == normalized)
        .ok_or_else(|| BikeshareError::InvalidInput {
            value: candidate.trim().to_string(),
            allowed: allowed.iter().map(|v| v.to_string()).collect(),
        })
}

/// Join choices as `a, b, c or d`.
pub fn list_choices<T: Display>(choices: &[T]) -> String {
    let names: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Asks questions on `output` and reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write text as-is.
    pub fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Print a question and read one answer line.
    ///
    /// Returns `None` once input is exhausted.
    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("Input closed while asking: {}", question.trim());
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask until the answer is one of `allowed`; `None` if input runs out.
    pub fn choose<T: Copy + Display>(
        &mut self,
        question: &str,
        allowed: &[T],
        noun: &str,
    ) -> Result<Option<T>> {
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(None);
            };
            match validate(&answer, allowed) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => {
                    debug!("Rejected {} answer: {}", noun, err);
                    writeln!(self.output, "Please enter a valid {}", noun)?;
                }
            }
        }
    }

    /// Yes/no question. Only "yes" (any case) counts as yes.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .ask(question)?
            .is_some_and(|answer| answer.trim().eq_ignore_ascii_case("yes")))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
