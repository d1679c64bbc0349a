//! Build-rule emission.
//!
//! Produces the full `build.ninja`: compile statements for every
//! recognized C/C++ source, one link, one binary extraction, and the
//! self-hosting utility statements (compilation-database dump and
//! expansion, cscope index). Nothing here runs a compiler; the ninja
//! engine executes the rules.

use crate::config::ProjectConfig;
use crate::syntax::NinjaWriter;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Language of a compile step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceLang {
    C,
    Cpp,
}

/// Classify a path by extension; `None` means no compile rule is emitted
/// for it (headers, directories, everything else).
fn classify(path: &Path) -> Option<SourceLang> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("c") => Some(SourceLang::C),
        Some("cpp") | Some("cc") | Some("cxx") => Some(SourceLang::Cpp),
        _ => None,
    }
}

/// Files directly under each source dir. Listing is non-recursive and
/// sorted per directory so regenerated build files diff cleanly. A
/// directory that cannot be read aborts rule generation.
fn collect_sources(config: &ProjectConfig) -> crate::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for dir in &config.source_dirs {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(dir.join(entry.file_name()));
        }
        entries.sort();
        sources.extend(entries);
    }

    Ok(sources)
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Emit the complete rule set for `config`.
pub fn emit<W: Write>(config: &ProjectConfig, w: &mut NinjaWriter<W>) -> crate::Result<()> {
    let includes = config.include_flags();
    let defines = config.define_flags();

    // Variable declarations
    w.variable(
        "cxxflags",
        &join_nonempty(&["-g -Wall -std=c++14", &includes, &defines]),
    )?;
    w.variable(
        "cflags",
        &join_nonempty(&["-g -Wall -std=c99", &includes, &defines]),
    )?;
    w.variable("lflags", "-lm -lstdc++ -lc")?;
    w.variable("libs", &config.library_flags())?;
    w.newline()?;

    // Rule declarations
    w.rule("cxx", "g++ $cxxflags -c $in -o $out")?;
    w.rule("cc", "gcc $cflags -c $in -o $out")?;
    w.rule("cl", "gcc -o $out $in $libs $lflags")?;
    w.rule("ocb", "objcopy -O binary $in $out")?;
    w.rule("cdb", "ninja -t compdb cc cxx > cc_preexp.json")?;
    w.rule(
        "cdb_e",
        "flint expand < cc_preexp.json > compile_commands.json",
    )?;

    // Unique search dirs for the cscope file list, sorted for determinism.
    let search_dirs: BTreeSet<String> = config
        .source_dirs
        .iter()
        .chain(config.include_dirs.iter())
        .map(|dir| dir.display().to_string())
        .collect();
    w.rule(
        "cscf",
        &format!(
            "find {} -regex \".*\\(\\.c\\|\\.h\\|.cpp\\|.hpp\\)$$\" -and -not -type d > $out",
            search_dirs.into_iter().collect::<Vec<_>>().join(" ")
        ),
    )?;
    w.rule("cscdb", "cscope -bq")?;
    w.newline()?;

    // Utility statements
    w.build(&["cc_preexp.json"], "cdb", &[])?;
    w.build(&["compile_commands.json"], "cdb_e", &["cc_preexp.json"])?;
    w.build(&["cscope.files"], "cscf", &[])?;
    w.build(
        &["cscope.in.out", "cscope.po.out", "cscope.out"],
        "cscdb",
        &["cscope.files"],
    )?;
    w.newline()?;

    // One compile statement per source; collect the objects for the link.
    let mut objects = Vec::new();
    for source in collect_sources(config)? {
        let Some(lang) = classify(&source) else {
            continue;
        };
        let object = source.with_extension("o").display().to_string();
        let source = source.display().to_string();
        let rule = match lang {
            SourceLang::C => "cc",
            SourceLang::Cpp => "cxx",
        };
        w.build(&[object.as_str()], rule, &[source.as_str()])?;
        objects.push(object);
    }
    w.newline()?;

    let object_refs: Vec<&str> = objects.iter().map(String::as_str).collect();
    w.build(&["main.elf"], "cl", &object_refs)?;
    w.build(&["main.bin"], "ocb", &["main.elf"])?;

    Ok(())
}

/// Generate `build.ninja` (or any other path) for `config`.
pub fn write_build_file(config: &ProjectConfig, path: &Path) -> crate::Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = NinjaWriter::new(io::BufWriter::new(file));
    emit(config, &mut writer)?;
    writer.flush()?;
    Ok(())
}
