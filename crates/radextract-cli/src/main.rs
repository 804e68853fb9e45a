mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "radextract",
    version,
    about = "Structured extraction of organ-level findings from free-text radiology reports"
)]
struct Cli {
    /// Log batch progress and per-row diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the extraction service settings read from the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Model name (default: RADEXTRACT_MODEL or gemini-3-flash-preview)
    #[arg(long, global = true, value_name = "NAME")]
    pub model: Option<String>,

    /// Service base URL (default: RADEXTRACT_BASE_URL or the public endpoint)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a single report (manual mode)
    Extract {
        /// Key ID for the report (e.g. MRN or accession number)
        #[arg(short, long)]
        key_id: String,

        /// Order ID for the report
        #[arg(long, default_value = "")]
        order_id: String,

        /// File containing the report text (reads stdin when omitted)
        input_file: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Also write a one-row pivoted CSV export to this file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Extract every row of a PatientID,OrderID,Report_Text CSV and export the results
    Batch {
        /// Path to the CSV upload (max 500 data rows)
        input_file: PathBuf,

        /// Export file (default: radiology_data_export_<millis>.csv in the current directory)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Print the CSV upload template
    Template {
        /// Write the template to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Interactive session: enter reports, review, load batches, export
    Session,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "radextract=info,radextract_core=info"
    } else {
        "radextract=warn,radextract_core=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            key_id,
            order_id,
            input_file,
            output,
            export,
        } => commands::extract::run(&cli.service, &key_id, &order_id, input_file, &output, export),
        Commands::Batch {
            input_file,
            out,
            output,
        } => commands::batch::run(&cli.service, input_file, out, &output),
        Commands::Template { out } => commands::template::run(out),
        Commands::Session => commands::session::run(&cli.service),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if e.is_retryable() {
            eprintln!("The extraction service call can be retried.");
        }
        std::process::exit(1);
    }
}
