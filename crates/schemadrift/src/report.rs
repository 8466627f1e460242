//! Plain-text rendering of comparison reports.

use crate::{Error, Report};
use std::fmt;
use std::io::{self, Write};

const INDENT: &str = "  ";

/// Writes indented lines to an output stream.
///
/// Each nesting level adds two spaces. Values are written as-is.
pub struct Reporter<W> {
    out: W,
    depth: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, depth: 0 }
    }

    /// Write one line at the current depth.
    pub fn line(&mut self, text: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{}{}", INDENT.repeat(self.depth), text)
    }

    pub fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Write a report: its heading, then one indented line per finding, or
    /// the subject's in-sync line when there are none.
    pub fn report(&mut self, report: &Report) -> io::Result<()> {
        self.line(report.subject.heading())?;
        self.indent();
        if report.is_in_sync() {
            self.line(report.subject.in_sync_message())?;
        } else {
            for finding in &report.findings {
                self.line(finding)?;
            }
        }
        self.dedent();
        Ok(())
    }

    pub fn error(&mut self, err: &Error) -> io::Result<()> {
        self.line(format_args!("Error: {err}"))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
