//! Output sink for command results
//!
//! Commands never write to the terminal directly. They hand rendered text or
//! JSON to an [`Output`], so tests can capture exactly what a run produced.

use crate::error::CliResult;
use std::io::{self, Write};

/// Destination for command results
pub trait Output: Send + Sync {
    /// One line of result text
    fn print(&self, msg: &str) -> CliResult<()>;

    /// Pretty-printed JSON document
    fn print_json(&self, data: &serde_json::Value) -> CliResult<()> {
        self.print(&serde_json::to_string_pretty(data)?)
    }

    /// Advisory note about a partial or unusual result
    fn warning(&self, msg: &str) -> CliResult<()> {
        self.print(&format!("warning: {}", msg))
    }

    /// Section title underlined to its width
    fn header(&self, title: &str) -> CliResult<()> {
        self.print(&format!("\n{}\n{}", title, "=".repeat(title.chars().count())))
    }

    /// Pre-rendered table lines
    fn lines(&self, lines: &[String]) -> CliResult<()> {
        for line in lines {
            self.print(line)?;
        }
        Ok(())
    }
}

/// Results to stdout, warnings to stderr
///
/// Keeping warnings off stdout leaves `--format json` output parseable.
/// Write failures (closed pipe) come back as `IoError` instead of panicking.
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn print(&self, msg: &str) -> CliResult<()> {
        writeln!(io::stdout().lock(), "{}", msg)?;
        Ok(())
    }

    fn warning(&self, msg: &str) -> CliResult<()> {
        writeln!(io::stderr().lock(), "warning: {}", msg)?;
        Ok(())
    }
}
