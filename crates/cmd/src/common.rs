// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use pipeline::PipelineConfig;
use warehouse::Session;

/// Environment variable naming the warehouse directory
pub const WAREHOUSE_ENV: &str = "WAREHOUSE";

/// Output format for query results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table (default)
    #[default]
    Table,
    /// Comma separated values with a header row
    Csv,
    /// Number of result rows only
    Count,
}

/// Get the warehouse path with an optional override, falling back to the WAREHOUSE environment variable
pub fn get_warehouse_path_with_override(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }

    env::var(WAREHOUSE_ENV)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("{WAREHOUSE_ENV} environment variable not set and --warehouse not given"))
}

/// Everything a command needs to find the warehouse
#[derive(Clone, Debug)]
pub struct WarehouseContext {
    pub warehouse_path: Option<PathBuf>,
    pub original_args: Vec<String>,
}

impl WarehouseContext {
    #[must_use]
    pub fn new(warehouse_path: Option<PathBuf>, original_args: Vec<String>) -> Self {
        Self {
            warehouse_path,
            original_args,
        }
    }

    pub fn resolve_path(&self) -> Result<PathBuf> {
        get_warehouse_path_with_override(self.warehouse_path.clone())
    }

    /// Open (creating if needed) the warehouse session
    pub async fn open_warehouse(&self) -> Result<Session> {
        let path = self.resolve_path()?;
        let args = self.original_args.join(" ");
        diagnostics::debug!("Opening warehouse for: {args}", args);
        Session::open(&path)
            .await
            .map_err(|e| anyhow!("Failed to open warehouse at {}: {}", path.display(), e))
    }
}

/// Load the pipeline config from a YAML file, or use the defaults
pub fn load_config(config_path: Option<&std::path::Path>) -> Result<PipelineConfig> {
    match config_path {
        Some(path) => Ok(PipelineConfig::from_path(path)?),
        None => Ok(PipelineConfig::default()),
    }
}
