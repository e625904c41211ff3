//! Input sources for the interactive session.
//!
//! [`InputProvider`] is the only way the session controller talks to the
//! user. [`TerminalInput`] drives a real terminal through dialoguer;
//! [`LineInput`] reads newline-separated answers from any reader, which
//! covers piped stdin as well as scripted tests.

use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use colored::Colorize;
use dialoguer::Input;
use pokerdb_types::Money;

/// Capability to ask the user for values and tell them things.
pub trait InputProvider {
    /// Next answer to `prompt`, trimmed.
    fn next_string(&mut self, prompt: &str) -> anyhow::Result<String>;

    /// Next amount. Answers that are not numbers are reported and asked again.
    fn next_amount(&mut self, prompt: &str) -> anyhow::Result<Money> {
        loop {
            let raw = self.next_string(prompt)?;
            match raw.parse::<Money>() {
                Ok(amount) => return Ok(amount),
                Err(e) => self.error(&e.to_string()),
            }
        }
    }

    fn show(&mut self, message: &str);

    fn error(&mut self, message: &str);
}

/// Interactive prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputProvider for TerminalInput {
    fn next_string(&mut self, prompt: &str) -> anyhow::Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .context("reading from terminal")?;
        Ok(answer.trim().to_string())
    }

    fn next_amount(&mut self, prompt: &str) -> anyhow::Result<Money> {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .validate_with(|s: &String| -> Result<(), String> {
                s.parse::<Money>().map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()
            .context("reading from terminal")?;
        Ok(answer.parse()?)
    }

    fn show(&mut self, message: &str) {
        println!("{message}");
    }

    fn error(&mut self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }
}

/// Line-oriented answers from a reader, prompts and messages to a writer.
pub struct LineInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: BufRead, W: Write> InputProvider for LineInput<R, W> {
    fn next_string(&mut self, prompt: &str) -> anyhow::Result<String> {
        write!(self.writer, "{prompt}: ")?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            bail!("unexpected end of input while waiting for: {prompt}");
        }
        Ok(line.trim().to_string())
    }

    fn show(&mut self, message: &str) {
        let _ = writeln!(self.writer, "{message}");
    }

    fn error(&mut self, message: &str) {
        let _ = writeln!(self.writer, "error: {message}");
    }
}
