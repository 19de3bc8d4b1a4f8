// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Session over a warehouse directory
//!
//! A warehouse is a directory whose children are Delta tables, one per
//! normalized [`TableName`]. The session hands out lazy DataFusion frames over
//! those tables and materializes frames back into them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_schema::{Schema, SchemaRef};
use datafusion::dataframe::DataFrame;
use datafusion::datasource::MemTable;
use datafusion::execution::context::{SessionConfig, SessionContext};
use datafusion::prelude::CsvReadOptions;
use datafusion::catalog::{CatalogProvider as _, SchemaProvider as _};
use datafusion::common::TableReference;
use deltalake::DeltaTable;
use diagnostics::*;

use crate::error::{Result, WarehouseError};
use crate::identifier::TableName;
use crate::writer::DataFrameWriter;

/// Directory that marks a Delta table
const DELTA_LOG_DIR: &str = "_delta_log";

pub struct Session {
    root: PathBuf,
    ctx: SessionContext,
}

impl Session {
    /// Open (creating if necessary) the warehouse rooted at `root`.
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if root.exists() && !root.is_dir() {
            return Err(WarehouseError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        tokio::fs::create_dir_all(root).await?;
        let root = tokio::fs::canonicalize(root).await?;

        let root_str = root.to_string_lossy().to_string();
        debug!("Opening warehouse at {root_str}", root_str);

        // Table and column names are upper-case; keep SQL identifiers as written
        let config = SessionConfig::new()
            .with_information_schema(true)
            .set_bool("datafusion.sql_parser.enable_ident_normalization", false);

        Ok(Self {
            root,
            ctx: SessionContext::new_with_config(config),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub(crate) fn table_path(&self, name: &TableName) -> PathBuf {
        self.root.join(name.as_str())
    }

    pub(crate) fn table_exists_at(&self, path: &Path) -> bool {
        path.join(DELTA_LOG_DIR).is_dir()
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let name = TableName::parse(name)?;
        Ok(self.table_exists_at(&self.table_path(&name)))
    }

    async fn open_delta(&self, name: &TableName) -> Result<DeltaTable> {
        let path = self.table_path(name);
        if !self.table_exists_at(&path) {
            return Err(WarehouseError::table_not_found(name.as_str()));
        }
        let uri = path.to_string_lossy().to_string();
        let table = deltalake::open_table(&uri).await?;
        let version = table.version();
        debug!("Opened table {uri} at version {version}", uri, version);
        Ok(table)
    }

    /// Lazy frame over a stored table.
    pub async fn table(&self, name: &str) -> Result<DataFrame> {
        let name = TableName::parse(name)?;
        let table = self.open_delta(&name).await?;
        Ok(self.ctx.read_table(Arc::new(table))?)
    }

    /// Plan a SQL query lazily. Every table in the warehouse is visible under
    /// its normalized name; tables removed since the last query are not.
    pub async fn sql(&self, query: &str) -> Result<DataFrame> {
        let names = self.table_names().await?;
        for stale in self.registered_tables() {
            if !names.iter().any(|name| name.as_str() == stale) {
                debug!("Deregistering missing table {stale}", stale);
                _ = self.ctx.deregister_table(TableReference::bare(stale))?;
            }
        }
        for name in names {
            let table = self.open_delta(&name).await?;
            let reference = TableReference::bare(name.as_str());
            _ = self.ctx.deregister_table(reference.clone())?;
            _ = self.ctx.register_table(reference, Arc::new(table))?;
        }
        debug!("Planning SQL: {query}", query);
        Ok(self.ctx.sql(query).await?)
    }

    /// Names currently registered in the default schema
    fn registered_tables(&self) -> Vec<String> {
        let state = self.ctx.state();
        let options = &state.config_options().catalog;
        self.ctx
            .catalog(&options.default_catalog)
            .and_then(|catalog| catalog.schema(&options.default_schema))
            .map(|schema| schema.table_names())
            .unwrap_or_default()
    }

    /// In-memory frame from record batches sharing `schema`.
    pub fn create_dataframe(&self, schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<DataFrame> {
        let table = MemTable::try_new(schema, vec![batches])?;
        Ok(self.ctx.read_table(Arc::new(table))?)
    }

    /// Frame over a CSV file with a header row. Without a schema, column types
    /// are inferred.
    pub async fn read_csv<P: AsRef<Path>>(&self, path: P, schema: Option<&Schema>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(WarehouseError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("CSV file not found: {}", path.display()),
            )));
        }
        let path_str = path.to_string_lossy().to_string();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut options = CsvReadOptions::new()
            .has_header(true)
            .file_extension(&extension);
        if let Some(schema) = schema {
            options = options.schema(schema);
        }

        debug!("Reading CSV {path_str}", path_str);
        Ok(self.ctx.read_csv(path_str, options).await?)
    }

    /// Names of all tables in the warehouse, sorted.
    pub async fn table_names(&self) -> Result<Vec<TableName>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !self.table_exists_at(&path) {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            // Directories that don't round-trip through the identifier rules
            // were not created by this session
            let unquoted = TableName::parse(&file_name)
                .ok()
                .filter(|name| name.as_str() == file_name);
            let quoted = || {
                TableName::parse(&format!("\"{file_name}\""))
                    .ok()
                    .filter(|name| name.as_str() == file_name)
            };
            match unquoted.or_else(quoted) {
                Some(name) => names.push(name),
                None => {
                    warn!("Skipping unrecognized table directory {file_name}", file_name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a table and all of its data.
    pub async fn drop_table(&self, name: &str) -> Result<()> {
        let name = TableName::parse(name)?;
        let path = self.table_path(&name);
        if !self.table_exists_at(&path) {
            return Err(WarehouseError::table_not_found(name.as_str()));
        }
        tokio::fs::remove_dir_all(&path).await?;
        _ = self.ctx.deregister_table(TableReference::bare(name.as_str()))?;
        let table = name.as_str();
        info!("Dropped table {table}", table);
        Ok(())
    }

    /// Start a write of `frame`; finish with [`DataFrameWriter::save_as_table`].
    pub fn write(&self, frame: DataFrame) -> DataFrameWriter<'_> {
        DataFrameWriter::new(self, frame)
    }
}
