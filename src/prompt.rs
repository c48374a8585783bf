//! # Operator prompt for the slot count.
//!
//! Asks once for the total number of slots and keeps asking until the answer
//! is a positive integer. End of input aborts with [`PromptError::Closed`].
//!
//! The reader and writer are generic so the prompt can be driven from tests.

use std::io::{BufRead, Write};
use std::num::NonZeroUsize;

use thiserror::Error;
use tracing::warn;

use crate::error::PromptError;

/// Why an answer is not a valid slot count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotCountError {
    /// Not an integer.
    #[error("`{0}` is not a number")]
    NotANumber(String),

    /// Zero or negative.
    #[error("slot count must be positive, got {0}")]
    NotPositive(i64),
}

/// Parses one answer. Surrounding whitespace is ignored.
pub fn parse_slot_count(input: &str) -> Result<NonZeroUsize, SlotCountError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| SlotCountError::NotANumber(trimmed.to_string()))?;

    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(SlotCountError::NotPositive(value))
}

/// Asks for the total slot count until a valid answer is given.
pub fn ask_slot_count<R, W>(mut input: R, mut output: W) -> Result<NonZeroUsize, PromptError>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "How many worker slots should run in total? ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }

        match parse_slot_count(&line) {
            Ok(n) => return Ok(n),
            Err(e) => {
                warn!(error = %e, "invalid slot count, asking again");
                writeln!(output, "Please enter a positive whole number ({e}).")?;
            }
        }
    }
}
