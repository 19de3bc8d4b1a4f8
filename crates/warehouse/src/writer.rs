// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Materializing lazy frames into Delta tables

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_schema::Schema;
use datafusion::dataframe::DataFrame;
use deltalake::DeltaOps;
use deltalake::delta_datafusion::DataFusionMixins;
use deltalake::operations::write::SchemaMode;
use deltalake::protocol::SaveMode;
use diagnostics::*;

use crate::error::{Result, WarehouseError};
use crate::identifier::TableName;
use crate::session::Session;

/// How a write treats a destination table that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace contents and schema
    Overwrite,
    /// Add rows to the existing contents
    Append,
    /// Fail if the table is present
    #[default]
    ErrorIfExists,
    /// Leave an existing table untouched
    Ignore,
}

impl WriteMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::Overwrite => "overwrite",
            WriteMode::Append => "append",
            WriteMode::ErrorIfExists => "errorifexists",
            WriteMode::Ignore => "ignore",
        }
    }

    fn save_mode(self) -> SaveMode {
        match self {
            WriteMode::Overwrite => SaveMode::Overwrite,
            WriteMode::Append => SaveMode::Append,
            WriteMode::ErrorIfExists => SaveMode::ErrorIfExists,
            WriteMode::Ignore => SaveMode::Ignore,
        }
    }
}

impl FromStr for WriteMode {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(WriteMode::Overwrite),
            "append" => Ok(WriteMode::Append),
            "errorifexists" | "error_if_exists" => Ok(WriteMode::ErrorIfExists),
            "ignore" => Ok(WriteMode::Ignore),
            _ => Err(WarehouseError::InvalidWriteMode(s.to_string())),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`DataFrameWriter::save_as_table`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub table: TableName,
    /// Delta version after the write
    pub version: i64,
    /// Rows written by this call
    pub rows: usize,
    /// True when `Ignore` found an existing table and wrote nothing
    pub skipped: bool,
}

impl fmt::Display for WriteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            write!(f, "Table {} already exists at version {}; nothing written", self.table, self.version)
        } else {
            write!(f, "Wrote {} rows to {} (version {})", self.rows, self.table, self.version)
        }
    }
}

/// Builder returned by [`Session::write`]
pub struct DataFrameWriter<'a> {
    session: &'a Session,
    frame: DataFrame,
    mode: WriteMode,
}

impl<'a> DataFrameWriter<'a> {
    pub(crate) fn new(session: &'a Session, frame: DataFrame) -> Self {
        Self {
            session,
            frame,
            mode: WriteMode::default(),
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Execute the frame and commit its rows to the named table.
    pub async fn save_as_table(self, name: &str) -> Result<WriteSummary> {
        let table = TableName::parse(name)?;
        let path = self.session.table_path(&table);
        let uri = path.to_string_lossy().to_string();
        let exists = self.session.table_exists_at(&path);
        let mode = self.mode.as_str();

        match (self.mode, exists) {
            (WriteMode::ErrorIfExists, true) => {
                return Err(WarehouseError::table_exists(table.as_str()));
            }
            (WriteMode::Ignore, true) => {
                let existing = deltalake::open_table(&uri).await?;
                let version = existing.version();
                info!("Table {uri} exists, ignoring write (version {version})", uri, version);
                return Ok(WriteSummary {
                    table,
                    version,
                    rows: 0,
                    skipped: true,
                });
            }
            _ => {}
        }

        let schema = Arc::clone(self.frame.schema().inner());
        let recreate = self.mode == WriteMode::Overwrite
            && exists
            && !same_columns(&*deltalake::open_table(&uri).await?.snapshot()?.arrow_schema()?, &schema);

        let mut batches = self.frame.collect().await?;
        batches.retain(|batch| batch.num_rows() > 0);
        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        if batches.is_empty() {
            // Still create (or truncate) the table with the frame's schema
            batches.push(RecordBatch::new_empty(schema));
        }

        debug!("Writing {rows} rows to {uri} with mode {mode}", rows, uri, mode);
        if recreate {
            // Delta keeps the old NOT NULL columns as invariants across a
            // schema overwrite, so a changed column set starts a new log
            info!("Replacing {uri} with a new column set", uri);
            tokio::fs::remove_dir_all(&path).await?;
        }
        tokio::fs::create_dir_all(&path).await?;

        let mut builder = DeltaOps::try_from_uri(&uri)
            .await?
            .write(batches)
            .with_save_mode(self.mode.save_mode());
        if self.mode == WriteMode::Overwrite {
            builder = builder.with_schema_mode(SchemaMode::Overwrite);
        }
        let written = builder.await?;

        let version = written.version();
        info!("Committed {rows} rows to {uri} at version {version}", rows, uri, version);

        Ok(WriteSummary {
            table,
            version,
            rows,
            skipped: false,
        })
    }
}

/// Same column names, order and nullability
fn same_columns(current: &Schema, incoming: &Schema) -> bool {
    current.fields().len() == incoming.fields().len()
        && current
            .fields()
            .iter()
            .zip(incoming.fields().iter())
            .all(|(a, b)| a.name() == b.name() && a.is_nullable() == b.is_nullable())
}
