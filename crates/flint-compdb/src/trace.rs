//! Include tracing via the compiler's `-H` diagnostics.
//!
//! The compiler, not this crate, is the authority on what a source file
//! includes: each compile command is replayed with `-H` appended and the
//! resulting diagnostic lines (`<dots><space><path>`, one per include,
//! depth-first) are parsed into a depth-grouped trace. No preprocessing
//! happens here.

use crate::CompileRecord;
use std::collections::BTreeMap;
use std::process::Command;
use thiserror::Error;

/// Errors from a single trace invocation.
///
/// All of these are recoverable from the expander's point of view: a source
/// whose trace fails simply contributes no headers.
#[derive(Error, Debug)]
pub enum TraceError {
    /// The record's compile command was empty.
    #[error("record has an empty compile command")]
    EmptyCommand,

    /// The compiler subprocess could not be launched.
    #[error("failed to spawn compiler: {0}")]
    Spawn(#[from] std::io::Error),

    /// The compiler ran but exited with a failure status.
    #[error("compiler exited with {0}")]
    CompilerFailed(std::process::ExitStatus),
}

/// Include paths reported by one traced compile, grouped by nesting depth.
///
/// Depth 0 holds files included directly by the source, depth 1 files
/// included by a depth-0 header, and so on. Order within a depth is the
/// compiler's discovery order. Transient: recomputed per source, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeTrace {
    by_depth: BTreeMap<usize, Vec<String>>,
}

impl IncludeTrace {
    /// Parse `-H` style diagnostics.
    ///
    /// A trace line is a run of one or more `.` markers, a single space,
    /// and a path; the marker count is the nesting depth plus one. Lines
    /// that do not match (warnings, include-guard advice, blank lines) are
    /// skipped rather than treated as malformed input.
    pub fn parse(output: &str) -> Self {
        let mut by_depth: BTreeMap<usize, Vec<String>> = BTreeMap::new();

        for line in output.lines() {
            let dots = line.bytes().take_while(|&b| b == b'.').count();
            if dots == 0 {
                continue;
            }
            let Some(path) = line[dots..].strip_prefix(' ') else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            by_depth.entry(dots - 1).or_default().push(path.to_string());
        }

        Self { by_depth }
    }

    /// Build a trace from explicit `(depth, path)` entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let mut by_depth: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (depth, path) in entries {
            by_depth.entry(depth).or_default().push(path);
        }
        Self { by_depth }
    }

    /// Depth levels in ascending order, each with its paths in discovery
    /// order.
    pub fn depths(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.by_depth.iter().map(|(&d, paths)| (d, paths.as_slice()))
    }

    /// Returns true if the trace reported no includes.
    pub fn is_empty(&self) -> bool {
        self.by_depth.is_empty()
    }
}

/// Capability seam for include discovery.
///
/// Production code shells out to the real compiler via [`CompilerTracer`];
/// tests substitute scripted traces.
pub trait IncludeTracer {
    /// Discover the includes of `record`'s source file.
    fn trace_includes(&self, record: &CompileRecord) -> Result<IncludeTrace, TraceError>;
}

/// Traces includes by re-running the record's compile command with `-H`.
///
/// The invocation is synchronous and blocking with no timeout; the child's
/// output is fully drained before returning, so no handle outlives a single
/// call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompilerTracer;

impl IncludeTracer for CompilerTracer {
    fn trace_includes(&self, record: &CompileRecord) -> Result<IncludeTrace, TraceError> {
        // Whitespace split, matching how the command was assembled. Quoted
        // arguments containing spaces are not handled.
        let mut parts = record.command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(TraceError::EmptyCommand);
        };

        let output = Command::new(program)
            .args(parts)
            .arg("-H")
            .current_dir(&record.directory)
            .output()?;

        if !output.status.success() {
            return Err(TraceError::CompilerFailed(output.status));
        }

        // -H writes to stderr; fold stdout in as well so a compiler that
        // routes diagnostics differently still traces.
        let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stdout));
        Ok(IncludeTrace::parse(&text))
    }
}
