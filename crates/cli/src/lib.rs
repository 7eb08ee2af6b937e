mod merge;
mod query;
mod scan;
mod stats;

use clap::{Parser, Subcommand, ValueEnum};
use classdex_core::{BinarySerializer, ClassIndex, JsonSerializer, Serializer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use query::QueryKind;

#[derive(Parser)]
#[command(
    name = "classdex",
    version,
    about = "Index compiled JVM classes without loading them",
    long_about = "Classdex scans jars and class directories, records subtype and annotation \
                  relationships in a persistent index, and answers transitive queries over it."
)]
pub struct Cli {
    /// Also log to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan archives and directories and save the resulting index
    Scan {
        /// Jar files, class directories or jar URLs
        #[arg(value_name = "LOCATIONS")]
        locations: Vec<String>,
        /// Include/exclude rules over entry paths, e.g. "+com.acme, -com.acme.internal"
        #[arg(long)]
        filter: Option<String>,
        /// Include/exclude rules over recorded type names
        #[arg(long)]
        result_filter: Option<String>,
        /// Comma-separated partition names of the scanners to run
        #[arg(long, value_delimiter = ',')]
        scanners: Vec<String>,
        /// Worker threads; 0 means one per core. Sequential when absent.
        #[arg(long)]
        threads: Option<usize>,
        /// JSON scan profile; command-line options override its values
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Where to write the index
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Query a saved index
    Query {
        #[arg(long, value_name = "FILE")]
        index: PathBuf,
        #[arg(value_enum)]
        kind: QueryKind,
        /// Type, tag or resource name
        name: String,
    },
    /// Merge saved indices into one
    Merge {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        #[arg(value_name = "INDEX", required = true)]
        indices: Vec<PathBuf>,
    },
    /// Show per-partition key and value counts of a saved index
    Stats {
        #[arg(long, value_name = "FILE")]
        index: PathBuf,
    },
}

/// On-disk index format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Bin,
}

impl Format {
    /// Guess the format from a file extension; anything but `.bin` is JSON.
    pub fn of_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") => Format::Bin,
            _ => Format::Json,
        }
    }

    pub fn serializer(self) -> Arc<dyn Serializer> {
        match self {
            Format::Json => Arc::new(JsonSerializer::pretty()),
            Format::Bin => Arc::new(BinarySerializer),
        }
    }
}

pub(crate) fn load_index(path: &Path) -> classdex_core::Result<ClassIndex> {
    ClassIndex::collect_file(path, Format::of_path(path).serializer())
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let _guard = classdex_core::logging::init_logging("cli", cli.verbose);

    match cli.command {
        Commands::Scan {
            locations,
            filter,
            result_filter,
            scanners,
            threads,
            profile,
            format,
            output,
        } => scan::run(scan::ScanArgs {
            locations,
            filter,
            result_filter,
            scanners,
            threads,
            profile,
            format,
            output,
        }),
        Commands::Query { index, kind, name } => query::run(&index, kind, &name),
        Commands::Merge { output, indices } => merge::run(&output, &indices),
        Commands::Stats { index } => stats::run(&index),
    }
}
