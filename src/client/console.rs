//! Operator I/O collaborators
//!
//! The command loop and the receiver thread both write to a [`Console`]; the
//! interactive client reads operator input through a [`LineSource`]. Neither
//! is tied to a terminal, so both can be swapped out in tests.

use std::io::{self, BufRead, Write};

use crate::error::Result;
use crate::protocol::trim_line_ending;

/// Append-only output sink, shared by the command loop and the receiver
pub trait Console: Send + Sync {
    /// Show an operator-facing message
    fn notice(&self, message: &str);

    /// Show an unsolicited diagnostic push
    fn diagnostic(&self, message: &str);
}

/// Line-oriented input
pub trait LineSource {
    /// Show `prompt` and return the next completed line without its line
    /// ending, or `None` once input is exhausted
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Console writing to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn notice(&self, message: &str) {
        println!("{}", message);
    }

    fn diagnostic(&self, message: &str) {
        println!("----- Diagnostic: {} -----", message);
    }
}

/// Line source reading standard input
pub struct StdinLines {
    stdin: io::Stdin,
}

impl StdinLines {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for StdinLines {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if self.stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(trim_line_ending(&line).to_string()))
    }
}
