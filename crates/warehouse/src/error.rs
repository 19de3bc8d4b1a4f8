// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Error types for warehouse operations
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("Delta Lake error: {0}")]
    Delta(#[from] deltalake::DeltaTableError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("Table {name} does not exist")]
    TableNotFound { name: String },

    #[error("Table {name} already exists")]
    TableExists { name: String },

    #[error("Invalid write mode '{0}': expected overwrite, append, errorifexists or ignore")]
    InvalidWriteMode(String),

    #[error("Warehouse root is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl WarehouseError {
    pub fn invalid_identifier<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        WarehouseError::InvalidIdentifier {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn table_not_found<N: Into<String>>(name: N) -> Self {
        WarehouseError::TableNotFound { name: name.into() }
    }

    pub fn table_exists<N: Into<String>>(name: N) -> Self {
        WarehouseError::TableExists { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, WarehouseError>;
