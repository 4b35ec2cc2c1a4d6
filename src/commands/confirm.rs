//! Yes/no confirmation before the baseline is replaced.

use std::io::{self, BufRead, Write};

use crate::error::{Result, TidemarkError};

/// Source of the answer to "replace the baseline?".
pub trait Confirm {
    /// Asks `question` and returns `true` for an affirmative answer.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Prompts on stderr and reads one line from stdin.
///
/// `y` or `yes` (any case, surrounding whitespace ignored) is affirmative.
/// Anything else, including end of input, is a no.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "\n{question} (y/n): ").map_err(TidemarkError::ConsoleError)?;
        stderr.flush().map_err(TidemarkError::ConsoleError)?;

        read_answer(&mut io::stdin().lock())
    }
}

/// Always gives the same answer. Used for scripted runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(self.0)
    }
}

fn read_answer(input: &mut impl BufRead) -> Result<bool> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(TidemarkError::ConsoleError)?;
    if read == 0 {
        return Ok(false);
    }
    Ok(is_affirmative(&line))
}

fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_affirmative_answers() {
        for answer in ["y", "Y", "yes", "YES", "  y  \n", "Yes\r\n"] {
            assert!(is_affirmative(answer), "{answer:?} should be yes");
        }
        for answer in ["", "n", "no", "yep", "y es", "1"] {
            assert!(!is_affirmative(answer), "{answer:?} should be no");
        }
    }

    #[test]
    fn test_read_answer_reads_one_line() {
        let mut input = Cursor::new("y\nn\n");
        assert!(read_answer(&mut input).unwrap());
        assert!(!read_answer(&mut input).unwrap());
    }

    #[test]
    fn test_end_of_input_is_no() {
        let mut input = Cursor::new("");
        assert!(!read_answer(&mut input).unwrap());
    }

    #[test]
    fn test_fixed_answer() {
        assert!(FixedAnswer(true).confirm("?").unwrap());
        assert!(!FixedAnswer(false).confirm("?").unwrap());
    }
}
