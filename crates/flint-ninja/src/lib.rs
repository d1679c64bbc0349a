//! Ninja build-rule generation.
//!
//! This crate turns a source-file inventory into a `build.ninja` file: one
//! compile statement per C/C++ source, a single link, a single binary
//! extraction, and the utility statements that regenerate the compilation
//! database and cscope index. Configuration comes from an optional
//! `flint.toml`:
//!
//! ```toml
//! # flint.toml
//! source_dirs = ["src"]
//! include_dirs = ["include"]
//! libraries = ["-lpthread"]
//! defines = ["NDEBUG"]
//! ```

mod config;
mod error;
mod rules;
mod syntax;

pub use config::ProjectConfig;
pub use error::{NinjaError, Result};
pub use rules::{emit, write_build_file};
pub use syntax::NinjaWriter;
