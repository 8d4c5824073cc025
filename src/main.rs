//! CLI for bibtex-publications - Build the publication list of a site.

use std::fmt;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{debug, info_span, warn};

use bibtex_publications::{
    add_publications, output::render_context, settings::SettingsError, style::builtin_style_names,
    BackendError, Context, IndexPolicy, Outcome, Processor, ProcessorError, Settings,
    PUBLICATIONS_SRC,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Build a sorted publication list from a BibTeX file
#[derive(Parser)]
#[command(name = "bibtex-publications")]
#[command(version)]
#[command(after_help = "\
Examples:
  bibtex-publications build --settings site.toml
  bibtex-publications build --src content/refs.bib -o publications.json
  bibtex-publications styles")]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes priority
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the template context holding the publication list
    #[command(after_help = "\
Examples:
  bibtex-publications build --settings site.toml
  bibtex-publications build --src refs.bib --skip-invalid-index

The context is printed as JSON. It has no 'publications' key when no
bibliography is configured or the file cannot be parsed.")]
    Build {
        /// Settings file (TOML) with PUBLICATIONS_SRC and friends
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Bibliography file; overrides PUBLICATIONS_SRC
        #[arg(long)]
        src: Option<PathBuf>,

        /// Citation style (see 'styles' command)
        #[arg(long)]
        style: Option<String>,

        /// Leave out entries without an integer index instead of failing
        #[arg(long)]
        skip_invalid_index: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available builtin citation styles
    Styles,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: settings file not found / invalid
    Settings(String),
    /// Exit 11: an entry cannot be turned into a publication
    Publications(String),
    /// Exit 12: no bibliography backend available
    Backend(String),
    /// Exit 15: cannot write output file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Settings(_) => 10,
            AppError::Publications(_) => 11,
            AppError::Backend(_) => 12,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Settings(msg) => {
                write!(f, "{}\n  hint: the settings file must be valid TOML", msg)
            }
            AppError::Publications(msg) => {
                write!(
                    f,
                    "{}\n  hint: every entry needs an integer 'index' field (or pass --skip-invalid-index)",
                    msg
                )
            }
            AppError::Backend(msg) => write!(f, "{}", msg),
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        AppError::Settings(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Build {
            settings,
            src,
            style,
            skip_invalid_index,
            output,
        } => build_command(
            settings.as_deref(),
            src.as_deref(),
            style.as_deref(),
            skip_invalid_index,
            output.as_deref(),
        ),
        Commands::Styles => {
            styles_command();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Build the context and write it as JSON.
fn build_command(
    settings_path: Option<&Path>,
    src: Option<&Path>,
    style: Option<&str>,
    skip_invalid_index: bool,
    output: Option<&Path>,
) -> Result<(), AppError> {
    // 1. Load settings, command-line flags win
    let mut settings = match settings_path {
        Some(path) => Settings::load(path)
            .map_err(|e| AppError::Settings(format!("'{}': {}", path.display(), e)))?,
        None => Settings::new(),
    };
    if let Some(src) = src {
        settings.insert(PUBLICATIONS_SRC, src.to_string_lossy().into_owned());
    }

    // 2. Set up the processor; without a backend the build goes on without publications
    let mut context = Context::new();
    let processor = match Processor::with_default_backend() {
        Ok(processor) => processor,
        Err(e) => {
            warn!(error = %e, "publications disabled for this build");
            return write_context(&context, output);
        }
    };
    let span = info_span!("build", src = settings.publications_src().unwrap_or_default());
    let mut processor = processor.with_span(span).configure(&settings)?;
    if let Some(name) = style {
        processor = processor.with_style_name(name).map_err(|e| {
            AppError::Settings(format!(
                "{} (available: {})",
                e,
                builtin_style_names().join(", ")
            ))
        })?;
    }
    if skip_invalid_index {
        processor = processor.with_index_policy(IndexPolicy::Skip);
    }

    // 3. Run it
    let outcome = add_publications(&settings, &mut context, &processor)
        .map_err(map_processor_error)?;
    match &outcome {
        Outcome::Skipped => debug!("publications skipped"),
        Outcome::Failed(e) => debug!(error = %e, "publications omitted"),
        Outcome::Published(records) => debug!(count = records.len(), "publications built"),
    }

    // 4. Write to file or stdout
    write_context(&context, output)
}

fn write_context(context: &Context, output: Option<&Path>) -> Result<(), AppError> {
    let json = render_context(context)
        .map_err(|e| AppError::Publications(format!("cannot render context: {}", e)))?;
    if let Some(output_path) = output {
        fs::write(output_path, format!("{}\n", json)).map_err(|e| {
            AppError::OutputFile(format!("'{}': {}", output_path.display(), e))
        })?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", json)
            .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?;
    }

    Ok(())
}

/// Maps a ProcessorError to an AppError using type-safe matching.
fn map_processor_error(e: ProcessorError) -> AppError {
    match e {
        ProcessorError::Backend(BackendError::Unavailable) => AppError::Backend(e.to_string()),
        _ => AppError::Publications(e.to_string()),
    }
}

/// List available builtin citation styles.
fn styles_command() {
    for name in builtin_style_names() {
        println!("{}", name);
    }
}
