//! Compilation database model (compile_commands.json).
//!
//! A database is a flat JSON array of records, one per compiled unit.
//! Output is serialized with sorted keys and 4-space indentation so that
//! expanded databases diff cleanly against their inputs.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// File extensions that classify a path as a C-family header.
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hxx", "hh"];

/// Returns true if `path` carries a recognized header extension.
pub fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext))
}

/// A single compile command from compile_commands.json.
///
/// Fields are declared in alphabetical order; serde emits struct fields in
/// declaration order, which gives the sorted key order the output format
/// requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRecord {
    /// The full compilation command (single shell-invocable string).
    pub command: String,

    /// The working directory for compilation.
    pub directory: PathBuf,

    /// The source file path, as passed to the compiler.
    pub file: PathBuf,
}

/// An in-memory compilation database: an ordered sequence of records.
///
/// Loaded whole, appended to in memory, serialized whole. There is no
/// incremental or streaming mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationDatabase {
    records: Vec<CompileRecord>,
}

impl CompilationDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a database from a JSON string.
    ///
    /// This is the only fatal parse in the pipeline: a database that is not
    /// a valid record array aborts the run.
    pub fn from_str(json: &str) -> crate::Result<Self> {
        let records: Vec<CompileRecord> = serde_json::from_str(json)?;
        Ok(Self { records })
    }

    /// Parse a database from a reader (e.g. stdin).
    pub fn from_reader(reader: impl io::Read) -> crate::Result<Self> {
        let records: Vec<CompileRecord> = serde_json::from_reader(reader)?;
        Ok(Self { records })
    }

    /// All records, in order.
    pub fn records(&self) -> &[CompileRecord] {
        &self.records
    }

    /// Append a record.
    pub fn push(&mut self, record: CompileRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the database holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize with sorted keys and 4-space indentation.
    pub fn to_writer(&self, writer: impl io::Write) -> crate::Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
        self.records.serialize(&mut ser)?;
        Ok(())
    }

    /// Serialize to a string, same format as [`to_writer`](Self::to_writer).
    pub fn to_string_pretty(&self) -> crate::Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        // Serde only ever writes valid UTF-8.
        Ok(String::from_utf8(buf).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, e)
        })?)
    }
}

impl FromIterator<CompileRecord> for CompilationDatabase {
    fn from_iter<I: IntoIterator<Item = CompileRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
