//! The expansion algorithm: synthesize compile records for project-owned
//! headers so downstream tools can treat them as translation units.

use crate::db::{is_header, CompilationDatabase, CompileRecord};
use crate::trace::{IncludeTrace, IncludeTracer, TraceError};
use indexmap::IndexSet;
use std::path::{Component, Path, PathBuf};

/// Outcome of header discovery for one input record.
///
/// The expander never fails outright; callers decide whether failures are
/// worth reporting.
#[derive(Debug)]
pub enum SourceOutcome {
    /// The source was traced; `headers` records were synthesized from it.
    Expanded { file: PathBuf, headers: usize },

    /// The record already names a header, so no trace was attempted. This
    /// is what makes re-expanding an expanded database a no-op.
    SkippedHeader { file: PathBuf },

    /// The trace failed; the source contributes no headers.
    Failed { file: PathBuf, reason: TraceError },
}

/// Expands a compilation database with synthesized header records.
///
/// `base_dir` is the directory that owns compilable headers: only includes
/// that resolve beneath it are considered project headers. It should be an
/// absolute path.
pub struct Expander<T> {
    base_dir: PathBuf,
    tracer: T,
}

impl<T: IncludeTracer> Expander<T> {
    pub fn new(base_dir: impl Into<PathBuf>, tracer: T) -> Self {
        Self {
            base_dir: base_dir.into(),
            tracer,
        }
    }

    /// Expand `input`: every original record is carried over unchanged, and
    /// one synthesized record is appended for each newly discovered
    /// project-owned header, in source order then discovery order.
    ///
    /// Record identity is the lexically normalized absolute path, applied
    /// uniformly to originals and synthesized records, so a header already
    /// present under any spelling is skipped silently.
    pub fn expand(&self, input: &CompilationDatabase) -> (CompilationDatabase, Vec<SourceOutcome>) {
        let mut output = input.clone();
        let mut seen: IndexSet<PathBuf> = input
            .records()
            .iter()
            .map(|r| self.resolve(&r.directory, &r.file))
            .collect();
        let mut outcomes = Vec::with_capacity(input.len());

        for record in input.records() {
            if is_header(&record.file) {
                outcomes.push(SourceOutcome::SkippedHeader {
                    file: record.file.clone(),
                });
                continue;
            }

            let trace = match self.tracer.trace_includes(record) {
                Ok(trace) => trace,
                Err(reason) => {
                    log::debug!(
                        "include trace failed for {}: {}",
                        record.file.display(),
                        reason
                    );
                    outcomes.push(SourceOutcome::Failed {
                        file: record.file.clone(),
                        reason,
                    });
                    continue;
                }
            };

            let mut headers = 0;
            for path in self.project_includes(&trace, &record.directory) {
                if !is_header(Path::new(&path)) {
                    continue;
                }
                if !seen.insert(self.resolve(&record.directory, Path::new(&path))) {
                    continue;
                }
                output.push(synthesize(record, &path));
                headers += 1;
            }
            outcomes.push(SourceOutcome::Expanded {
                file: record.file.clone(),
                headers,
            });
        }

        (output, outcomes)
    }

    /// Depth-bounded containment filter.
    ///
    /// Walks depth levels in ascending order and keeps paths that resolve
    /// under `base_dir`. The first level with zero project-owned paths ends
    /// the scan: once the include chain has left the project tree,
    /// everything nested deeper is assumed foreign as well.
    fn project_includes(&self, trace: &IncludeTrace, directory: &Path) -> Vec<String> {
        let mut kept = Vec::new();

        for (_, paths) in trace.depths() {
            let before = kept.len();
            for path in paths {
                if self
                    .resolve(directory, Path::new(path))
                    .starts_with(&self.base_dir)
                {
                    kept.push(path.clone());
                }
            }
            if kept.len() == before {
                break;
            }
        }

        kept
    }

    /// Resolve `path` the way the traced compiler saw it: relative paths
    /// are anchored at the directory the command ran in, which itself may
    /// be relative to `base_dir`. Containment is then judged against
    /// `base_dir`, so a record compiled outside the project cannot smuggle
    /// its local headers in through a relative spelling.
    fn resolve(&self, directory: &Path, path: &Path) -> PathBuf {
        let dir = normalize_under(&self.base_dir, directory);
        normalize_under(&dir, path)
    }
}

/// Derive a record for `header` from the record whose trace discovered it.
fn synthesize(origin: &CompileRecord, header: &str) -> CompileRecord {
    CompileRecord {
        command: rewrite_command(&origin.command, &origin.file, header),
        directory: origin.directory.clone(),
        file: PathBuf::from(header),
    }
}

/// Swap the source argument of a compile command for the header path.
///
/// Only whole arguments equal to the source path, or to the source path
/// with its extension stripped, are replaced. Everything else, whitespace
/// runs included, is carried over verbatim; the rewrite assumes the
/// command names the source verbatim as a positional argument.
fn rewrite_command(command: &str, source: &Path, header: &str) -> String {
    let source_str = source.to_string_lossy();
    let stem = source.with_extension("");
    let stem_str = stem.to_string_lossy();

    let mut out = String::with_capacity(command.len());
    let mut rest = command;
    while !rest.is_empty() {
        let arg_start = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        out.push_str(&rest[..arg_start]);
        rest = &rest[arg_start..];

        let arg_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let arg = &rest[..arg_end];
        if arg == source_str || arg == stem_str {
            out.push_str(header);
        } else {
            out.push_str(arg);
        }
        rest = &rest[arg_end..];
    }
    out
}

/// Lexical normalization: absolutize `path` against `base` and collapse
/// `.` and `..` components. No filesystem access, so paths the build has
/// not materialized yet (or symlinked trees) resolve the same way every
/// run.
fn normalize_under(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
