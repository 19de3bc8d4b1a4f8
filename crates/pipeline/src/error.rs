// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading or writing a table failed
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] warehouse::WarehouseError),

    /// Planning or executing a frame failed
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),

    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config values are inconsistent
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A source table lacks columns the pipeline reads, or stores them with
    /// unusable types
    #[error(
        "Table {table} does not match its expected schema (missing: [{}]; wrong type: [{}])",
        missing.join(", "),
        mismatched.join(", ")
    )]
    SchemaMismatch {
        table: String,
        missing: Vec<String>,
        mismatched: Vec<String>,
    },

    /// Pivot arguments are unusable
    #[error("Invalid pivot: {0}")]
    InvalidPivot(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
