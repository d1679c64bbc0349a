//! Compilation-database header expansion.
//!
//! This crate provides:
//! - compile_commands.json parsing and deterministic serialization
//! - include tracing by replaying compile commands with `-H`
//! - the expansion algorithm that synthesizes compile records for
//!   project-owned headers
//!
//! # Example
//!
//! ```no_run
//! use flint_compdb::{CompilationDatabase, CompilerTracer, Expander};
//!
//! let db = CompilationDatabase::from_str(r#"[
//!     {
//!         "command": "g++ -I/proj -c a.cpp -o a.o",
//!         "directory": "/proj",
//!         "file": "a.cpp"
//!     }
//! ]"#).unwrap();
//!
//! let expander = Expander::new("/proj", CompilerTracer);
//! let (expanded, _outcomes) = expander.expand(&db);
//! println!("{}", expanded.to_string_pretty().unwrap());
//! ```

mod db;
mod error;
mod expand;
mod trace;

pub use db::{is_header, CompilationDatabase, CompileRecord, HEADER_EXTENSIONS};
pub use error::{CompdbError, Result};
pub use expand::{Expander, SourceOutcome};
pub use trace::{CompilerTracer, IncludeTrace, IncludeTracer, TraceError};
