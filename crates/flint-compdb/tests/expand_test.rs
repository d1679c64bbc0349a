//! Integration tests for compilation-database expansion.

use flint_compdb::{
    CompilationDatabase, CompileRecord, Expander, IncludeTrace, IncludeTracer, SourceOutcome,
    TraceError,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// Scripted tracer: maps a source file to a canned trace, or to a failure.
struct FakeTracer {
    traces: HashMap<PathBuf, Vec<(usize, String)>>,
    failures: Vec<PathBuf>,
}

impl FakeTracer {
    fn new() -> Self {
        Self {
            traces: HashMap::new(),
            failures: Vec::new(),
        }
    }

    fn with_trace(mut self, file: &str, entries: &[(usize, &str)]) -> Self {
        self.traces.insert(
            PathBuf::from(file),
            entries.iter().map(|&(d, p)| (d, p.to_string())).collect(),
        );
        self
    }

    fn failing_for(mut self, file: &str) -> Self {
        self.failures.push(PathBuf::from(file));
        self
    }
}

impl IncludeTracer for FakeTracer {
    fn trace_includes(&self, record: &CompileRecord) -> Result<IncludeTrace, TraceError> {
        if self.failures.contains(&record.file) {
            return Err(TraceError::Spawn(std::io::Error::other(
                "scripted compiler failure",
            )));
        }
        let entries = self.traces.get(&record.file).cloned().unwrap_or_default();
        Ok(IncludeTrace::from_entries(entries))
    }
}

fn record(file: &str, directory: &str, command: &str) -> CompileRecord {
    CompileRecord {
        command: command.to_string(),
        directory: PathBuf::from(directory),
        file: PathBuf::from(file),
    }
}

fn db(records: &[CompileRecord]) -> CompilationDatabase {
    records.iter().cloned().collect()
}

/// The worked example: one source, one project header at depth 0, one
/// foreign header at depth 1.
#[test]
fn test_expands_project_header() {
    let input = db(&[record("a.cpp", "/proj", "g++ -I/proj -c a.cpp -o a.o")]);
    let tracer = FakeTracer::new().with_trace(
        "a.cpp",
        &[(0, "/proj/a.h"), (1, "/usr/include/stdio.h")],
    );

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    assert_eq!(output.len(), 2);
    assert_eq!(output.records()[0], input.records()[0]);

    let synth = &output.records()[1];
    assert_eq!(synth.file, PathBuf::from("/proj/a.h"));
    assert_eq!(synth.directory, PathBuf::from("/proj"));
    assert_eq!(synth.command, "g++ -I/proj -c /proj/a.h -o a.o");
}

#[test]
fn test_foreign_headers_never_synthesized() {
    let input = db(&[record("a.cpp", "/proj", "g++ -c a.cpp")]);
    let tracer = FakeTracer::new().with_trace(
        "a.cpp",
        &[
            (0, "/proj/a.h"),
            (0, "/usr/include/vector"),
            (1, "/usr/include/stdio.h"),
        ],
    );

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    for rec in output.records() {
        assert!(!rec.file.starts_with("/usr"));
    }
    assert_eq!(output.len(), 2);
}

/// Depth bounding: a level with zero project-owned paths ends the scan,
/// even when deeper levels contain project paths.
#[test]
fn test_depth_bounding_stops_at_first_foreign_level() {
    let input = db(&[record("a.cpp", "/proj", "g++ -c a.cpp")]);
    let tracer = FakeTracer::new().with_trace(
        "a.cpp",
        &[
            (0, "/proj/top.h"),
            (1, "/usr/include/string.h"),
            (2, "/proj/deep.h"),
        ],
    );

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    let files: Vec<_> = output.records().iter().map(|r| r.file.clone()).collect();
    assert!(files.contains(&PathBuf::from("/proj/top.h")));
    assert!(!files.contains(&PathBuf::from("/proj/deep.h")));
}

#[test]
fn test_non_header_project_files_filtered() {
    let input = db(&[record("a.cpp", "/proj", "g++ -c a.cpp")]);
    let tracer = FakeTracer::new().with_trace(
        "a.cpp",
        &[(0, "/proj/a.h"), (0, "/proj/gen.inc"), (0, "/proj/b.hpp")],
    );

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    let files: Vec<_> = output.records().iter().map(|r| r.file.clone()).collect();
    assert!(files.contains(&PathBuf::from("/proj/a.h")));
    assert!(files.contains(&PathBuf::from("/proj/b.hpp")));
    assert!(!files.contains(&PathBuf::from("/proj/gen.inc")));
}

/// A failed trace degrades to "no headers for this source" and never
/// aborts the run.
#[test]
fn test_subprocess_failure_is_recoverable() {
    let input = db(&[
        record("a.cpp", "/proj", "g++ -c a.cpp"),
        record("b.cpp", "/proj", "g++ -c b.cpp"),
    ]);
    let tracer = FakeTracer::new()
        .failing_for("a.cpp")
        .with_trace("b.cpp", &[(0, "/proj/b.h")]);

    let (output, outcomes) = Expander::new("/proj", tracer).expand(&input);

    assert_eq!(output.len(), 3);
    assert!(matches!(
        outcomes[0],
        SourceOutcome::Failed { ref file, .. } if file == &PathBuf::from("a.cpp")
    ));
    assert!(matches!(
        outcomes[1],
        SourceOutcome::Expanded { headers: 1, .. }
    ));
}

/// Re-expanding an expanded database adds nothing: header records are
/// skipped outright and every discoverable header is already present.
#[test]
fn test_idempotence() {
    let input = db(&[record("a.cpp", "/proj", "g++ -c a.cpp -o a.o")]);
    let entries: &[(usize, &str)] = &[(0, "/proj/a.h"), (0, "/proj/b.h")];

    let tracer = FakeTracer::new().with_trace("a.cpp", entries);
    let (first, _) = Expander::new("/proj", tracer).expand(&input);
    assert_eq!(first.len(), 3);

    let tracer = FakeTracer::new().with_trace("a.cpp", entries);
    let (second, outcomes) = Expander::new("/proj", tracer).expand(&first);

    assert_eq!(first, second);
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, SourceOutcome::SkippedHeader { .. })));
}

/// Two sources including the same header produce exactly one synthesized
/// record, attributed to whichever source came first.
#[test]
fn test_shared_header_synthesized_once() {
    let input = db(&[
        record("a.cpp", "/proj", "g++ -c a.cpp"),
        record("b.cpp", "/proj", "g++ -c b.cpp"),
    ]);
    let tracer = FakeTracer::new()
        .with_trace("a.cpp", &[(0, "/proj/shared.h")])
        .with_trace("b.cpp", &[(0, "/proj/shared.h")]);

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    assert_eq!(output.len(), 3);
    let synth = &output.records()[2];
    assert_eq!(synth.command, "g++ -c /proj/shared.h");
}

/// Identity is the normalized path: the same header reached under two
/// spellings is deduplicated, while same-basename headers in different
/// directories both survive.
#[test]
fn test_normalized_path_identity() {
    let input = db(&[
        record("a.cpp", "/proj", "g++ -c a.cpp"),
        record("b.cpp", "/proj", "g++ -c b.cpp"),
    ]);
    let tracer = FakeTracer::new()
        .with_trace("a.cpp", &[(0, "/proj/sub/../util.h"), (0, "/proj/net/api.h")])
        .with_trace("b.cpp", &[(0, "/proj/util.h"), (0, "/proj/disk/api.h")]);

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    let files: Vec<_> = output.records().iter().map(|r| r.file.clone()).collect();
    // "/proj/sub/../util.h" and "/proj/util.h" are one header.
    assert_eq!(output.len(), 5);
    assert!(files.contains(&PathBuf::from("/proj/net/api.h")));
    assert!(files.contains(&PathBuf::from("/proj/disk/api.h")));
}

/// Originals pass through byte-identical and in order; expansion only
/// appends.
#[test]
fn test_schema_preservation() {
    let input = db(&[
        record("a.cpp", "/proj", "g++ -DWEIRD='1  2' -c a.cpp"),
        record("b.c", "/other", "gcc -c b.c"),
    ]);
    let tracer = FakeTracer::new().with_trace("a.cpp", &[(0, "/proj/a.h")]);

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    assert_eq!(&output.records()[..input.len()], input.records());
}

#[test]
fn test_relative_trace_paths_resolve_against_compile_directory() {
    let input = db(&[record("a.cpp", "/proj", "g++ -c a.cpp")]);
    let tracer = FakeTracer::new().with_trace(
        "a.cpp",
        &[(0, "src/a.h"), (0, "../outside/evil.h")],
    );

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    let files: Vec<_> = output.records().iter().map(|r| r.file.clone()).collect();
    assert!(files.contains(&PathBuf::from("src/a.h")));
    assert!(!files.iter().any(|f| f.ends_with("evil.h")));
}

/// A record compiled outside the project must not smuggle in its local
/// headers through a relative spelling, and a record compiled in a project
/// subdirectory may reach project headers through `..`. Relative trace
/// paths are anchored where the compiler ran, not at the project base.
#[test]
fn test_record_directory_anchors_relative_trace_paths() {
    let input = db(&[
        record("a.cpp", "/elsewhere", "g++ -c a.cpp"),
        record("b.cpp", "/proj/sub", "g++ -c b.cpp"),
    ]);
    let tracer = FakeTracer::new()
        // Resolves to /elsewhere/foo.h: foreign despite the bare spelling.
        .with_trace("a.cpp", &[(0, "foo.h")])
        // Resolves to /proj/shared.h: project-owned.
        .with_trace("b.cpp", &[(0, "../shared.h")]);

    let (output, _) = Expander::new("/proj", tracer).expand(&input);

    let files: Vec<_> = output.records().iter().map(|r| r.file.clone()).collect();
    assert!(
        !files.iter().any(|f| f.ends_with("foo.h")),
        "foreign header synthesized"
    );
    assert!(files.contains(&PathBuf::from("../shared.h")));
    assert_eq!(output.len(), 3);
}

#[cfg(unix)]
mod real_subprocess {
    use super::*;
    use flint_compdb::CompilerTracer;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// End-to-end through a real subprocess: a stand-in compiler prints a
    /// `-H` style trace on stderr.
    #[test]
    fn test_compiler_tracer_against_fake_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();
        fs::write(base.join("a.h"), "").unwrap();

        let compiler = write_script(
            &base,
            "fakecc",
            &format!(
                "printf '. {}/a.h\\n.. /usr/include/stdio.h\\n' >&2\n",
                base.display()
            ),
        );

        let input = db(&[record(
            "a.cpp",
            base.to_str().unwrap(),
            &format!("{} -c a.cpp -o a.o", compiler.display()),
        )]);

        let (output, outcomes) = Expander::new(&base, CompilerTracer).expand(&input);

        assert_eq!(output.len(), 2);
        assert_eq!(output.records()[1].file, base.join("a.h"));
        assert!(matches!(
            outcomes[0],
            SourceOutcome::Expanded { headers: 1, .. }
        ));
    }

    /// A compiler that exits nonzero contributes nothing and fails nothing.
    #[test]
    fn test_compiler_tracer_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();
        let compiler = write_script(&base, "failcc", "exit 1\n");

        let input = db(&[record(
            "b.cpp",
            base.to_str().unwrap(),
            &format!("{} -c b.cpp", compiler.display()),
        )]);

        let (output, outcomes) = Expander::new(&base, CompilerTracer).expand(&input);

        assert_eq!(output.len(), 1);
        assert!(matches!(
            outcomes[0],
            SourceOutcome::Failed {
                reason: TraceError::CompilerFailed(_),
                ..
            }
        ));
    }
}
