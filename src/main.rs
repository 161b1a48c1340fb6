use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use worker_registry::backend::HttpBackend;
use worker_registry::cli::{self, ExportOptions};
use worker_registry::config::RegistryConfig;
use worker_registry::error::RegistryResult;
use worker_registry::excel::ExportFormat;

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Worker registry: spreadsheet import, export and record management")]
#[command(long_about = "Registry - worker records in and out of spreadsheets

All dates are day-first: 13/1/2001 is 13 January 2001, never a month-first
date. Serial dates, ISO text and -, ., / separators are all normalized to
dd/mm/yyyy before validation.

COMMANDS:
  import      - Preview an .xlsx upload, optionally submit it
  template    - Write the blank import template
  export      - Records to .xlsx or a PDF report
  list        - Show the worker list
  search      - Backend search by KEY=VALUE
  add / edit  - Create or update one worker from a JSON file
  delete      - Remove a worker by id
  check-date  - Show how a date value is normalized

EXAMPLES:
  registry import workers.xlsx                 # Preview and list date errors
  registry import workers.xlsx --submit        # Import when every date is valid
  registry export out.xlsx --columns NAMA,TTL
  registry export report.pdf --detail --title \"BSTF II\"
  registry check-date 1/13/2001 13.1.2001")]
#[command(version)]
struct Cli {
    /// YAML config file
    #[arg(short, long, global = true, env = "REGISTRY_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "REGISTRY_BASE_URL")]
    base_url: Option<String>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Preview a spreadsheet upload.

The first sheet is read; its first row must hold the field keys (NAMA, NIK,
TTL, ...). NIK is reduced to digits, RT_RW 001002 becomes 001/002, body
measures accept 1.250,5 style numbers and TTL is normalized day-first.

Every invalid date is listed with its sheet row. With --submit the rows are
sent to the backend in one bulk import, but only when no date errors remain.")]
    /// Preview (and optionally submit) an .xlsx upload
    Import {
        /// Path to the .xlsx file
        file: PathBuf,

        /// Send the rows to the backend when the sheet has no errors
        #[arg(long)]
        submit: bool,
    },

    /// Write the import template workbook
    Template {
        /// Output path
        #[arg(default_value = "Template_Data_Pekerja_Indonesia.xlsx")]
        output: PathBuf,
    },

    #[command(long_about = "Export records to a spreadsheet or a PDF report.

Records come from the backend (basic or --detail list) or from a JSON file
given with --input. TTL is written as dd/mm/yyyy text so spreadsheet tools
never reinterpret it; TINGGI_BADAN and BERAT_BADAN carry CM and KG.

The format follows --format, else the output extension, else xlsx. Without
an output path the file is named DataPekerja_dd-mm-yyyy.<ext>.")]
    /// Export records to .xlsx or PDF
    Export {
        /// Output file (.xlsx or .pdf)
        output: Option<PathBuf>,

        /// Comma-separated field keys, in output order
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Report title
        #[arg(short, long)]
        title: Option<String>,

        /// xlsx or pdf
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Use the detail list
        #[arg(long)]
        detail: bool,

        /// Read records from a JSON array instead of the backend
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Field to filter on
        #[arg(long)]
        field: Option<String>,

        /// Case-insensitive text the field must contain
        #[arg(long)]
        query: Option<String>,
    },

    /// Show the worker list
    List {
        /// Use the detail list
        #[arg(long)]
        detail: bool,

        /// Field to filter on
        #[arg(long)]
        field: Option<String>,

        /// Case-insensitive text the field must contain
        #[arg(long)]
        query: Option<String>,
    },

    /// Search the backend with KEY=VALUE criteria
    Search {
        #[arg(required = true)]
        criteria: Vec<String>,
    },

    /// Create a worker from a JSON record file
    Add {
        file: PathBuf,

        /// Create in the detail list
        #[arg(long)]
        detail: bool,
    },

    /// Update a worker from a JSON record file (must include "id")
    Edit {
        file: PathBuf,

        /// Update in the detail list
        #[arg(long)]
        detail: bool,
    },

    /// Delete a worker by backend id
    Delete { id: String },

    /// Normalize and validate date values
    CheckDate {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "❌".red(), e.user_message().red());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> RegistryResult<()> {
    let config = RegistryConfig::load(cli.config.as_deref(), cli.base_url)?;
    let backend = HttpBackend::new(&config.backend);

    match cli.command {
        Commands::Import { file, submit } => cli::import(file, submit, &backend).await,

        Commands::Template { output } => cli::template(output),

        Commands::Export {
            output,
            columns,
            title,
            format,
            detail,
            input,
            field,
            query,
        } => {
            let options = ExportOptions {
                output,
                columns,
                title,
                format,
                detail,
                input,
                field,
                query,
            };
            cli::export(options, &config, &backend).await
        }

        Commands::List {
            detail,
            field,
            query,
        } => cli::list(detail, field, query, &backend).await,

        Commands::Search { criteria } => cli::search(criteria, &backend).await,

        Commands::Add { file, detail } => cli::add(file, detail, &backend).await,

        Commands::Edit { file, detail } => cli::edit(file, detail, &backend).await,

        Commands::Delete { id } => cli::delete(id, &backend).await,

        Commands::CheckDate { values } => cli::check_date(values),
    }
}
