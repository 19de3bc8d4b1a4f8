// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Load command - seeds a warehouse table from a CSV file
//!
//! The two pipeline source tables are read with their fixed schemas, so a
//! date column parses as a date and costs as floating point. Any other table
//! takes the types DataFusion infers from the file.

use std::path::Path;

use anyhow::{Context, Result};
use pipeline::schema::known_schema;
use warehouse::{TableName, WriteMode};

use crate::common::WarehouseContext;

pub async fn load_command<F>(
    context: &WarehouseContext,
    table: &str,
    csv_path: &Path,
    mode: WriteMode,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let name = TableName::parse(table)?;
    let schema = known_schema(&name);
    let session = context.open_warehouse().await?;

    let source = csv_path.display().to_string();
    let target = name.as_str();
    let inferred = schema.is_none();
    diagnostics::debug!(
        "Loading {source} into {target} (inferred schema: {inferred})",
        source,
        target,
        inferred
    );

    let frame = session
        .read_csv(csv_path, schema.as_deref())
        .await
        .with_context(|| format!("Failed to read {source}"))?;

    let summary = session
        .write(frame)
        .mode(mode)
        .save_as_table(target)
        .await?;

    handler(&format!("{summary}\n"));
    Ok(())
}
