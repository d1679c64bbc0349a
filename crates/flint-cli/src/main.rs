use clap::{Parser, Subcommand};
use flint_compdb::{CompilationDatabase, CompilerTracer, Expander, SourceOutcome};
use flint_ninja::ProjectConfig;
use miette::{IntoDiagnostic, Result};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "flint")]
#[command(author, version, about = "Ninja rule generation and compilation-database header expansion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate build.ninja for the current directory
    Configure,

    /// Read a compilation database on stdin, write the header-expanded
    /// database to stdout
    Expand {
        /// Project base directory that owns compilable headers
        /// (default: current directory)
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Configure => {
            let cwd = std::env::current_dir().into_diagnostic()?;
            let config = ProjectConfig::load_or_default(&cwd).into_diagnostic()?;
            flint_ninja::write_build_file(&config, Path::new("build.ninja")).into_diagnostic()?;
        }

        Commands::Expand { base_dir } => {
            let cwd = std::env::current_dir().into_diagnostic()?;
            let base = match base_dir {
                Some(dir) if dir.is_absolute() => dir,
                Some(dir) => cwd.join(dir),
                None => cwd,
            };

            let mut input = String::new();
            io::stdin().read_to_string(&mut input).into_diagnostic()?;
            // The only fatal condition: the database itself fails to parse.
            let db = CompilationDatabase::from_str(&input).into_diagnostic()?;

            let expander = Expander::new(base, CompilerTracer);
            let (expanded, outcomes) = expander.expand(&db);

            // Per-source failures stay out of the exit status; surface them
            // only when logging is switched on.
            for outcome in &outcomes {
                if let SourceOutcome::Failed { file, reason } = outcome {
                    log::warn!("no includes discovered for {}: {}", file.display(), reason);
                }
            }

            let mut stdout = io::stdout().lock();
            expanded.to_writer(&mut stdout).into_diagnostic()?;
            writeln!(stdout).into_diagnostic()?;
        }
    }

    Ok(())
}
