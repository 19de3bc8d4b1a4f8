// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use warehouse::WriteMode;

use cmd::commands;
use cmd::common::{OutputFormat, WarehouseContext};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "adspend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Warehouse directory (defaults to the WAREHOUSE environment variable)
    #[arg(long, global = true)]
    warehouse: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute monthly spend per channel joined with revenue and save it
    Run {
        /// YAML pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load a CSV file with a header row into a table
    Load {
        /// Destination table
        table: String,
        /// CSV file on the host filesystem
        csv: PathBuf,
        /// overwrite, append, errorifexists or ignore
        #[arg(short, long, default_value = "errorifexists")]
        mode: WriteMode,
    },
    /// Preview the first rows of a table
    Show {
        table: String,
        /// Number of rows
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,
    },
    /// Run a SQL query over the warehouse tables
    Query {
        sql: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the plan of the pipeline result without writing it
    Explain {
        /// YAML pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Include every intermediate plan
        #[arg(short, long)]
        verbose: bool,
    },
    /// List warehouse tables
    Tables,
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();

    let original_args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse();
    let context = WarehouseContext::new(cli.warehouse, original_args);

    let print = |output: &str| print!("{output}");

    match cli.command {
        Commands::Run { config } => {
            commands::run_command(&context, config.as_deref(), print).await
        }
        Commands::Load { table, csv, mode } => {
            commands::load_command(&context, &table, &csv, mode, print).await
        }
        Commands::Show { table, rows } => {
            commands::show_command(&context, &table, rows, print).await
        }
        Commands::Query { sql, format } => {
            commands::query_command(&context, &sql, format, print).await
        }
        Commands::Explain { config, verbose } => {
            commands::explain_command(&context, config.as_deref(), verbose, print).await
        }
        Commands::Tables => commands::tables_command(&context, print).await,
    }
}
