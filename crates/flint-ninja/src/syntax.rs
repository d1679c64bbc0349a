//! Minimal writer for the ninja build-file syntax.
//!
//! Covers only the subset rule generation needs: top-level variables,
//! rules with a single `command`, and build statements. Escaping of the
//! `$`, space, and `:` characters in paths is not handled.

use std::io::{self, Write};

/// Writes ninja syntax to an underlying stream.
pub struct NinjaWriter<W: Write> {
    out: W,
}

impl<W: Write> NinjaWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// `name = value`
    pub fn variable(&mut self, name: &str, value: &str) -> io::Result<()> {
        writeln!(self.out, "{name} = {value}")
    }

    /// `rule name` with an indented `command`.
    pub fn rule(&mut self, name: &str, command: &str) -> io::Result<()> {
        writeln!(self.out, "rule {name}")?;
        writeln!(self.out, "  command = {command}")
    }

    /// `build outputs: rule inputs`
    pub fn build(&mut self, outputs: &[&str], rule: &str, inputs: &[&str]) -> io::Result<()> {
        write!(self.out, "build {}: {rule}", outputs.join(" "))?;
        if !inputs.is_empty() {
            write!(self.out, " {}", inputs.join(" "))?;
        }
        writeln!(self.out)
    }

    /// Blank separator line.
    pub fn newline(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
