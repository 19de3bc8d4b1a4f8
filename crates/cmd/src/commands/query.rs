// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use arrow_csv::WriterBuilder;
use futures::StreamExt;

use crate::common::{OutputFormat, WarehouseContext};

/// Execute SQL against the warehouse. Every table is visible under its
/// normalized (upper-case unless quoted) name.
pub async fn query_command<F>(
    context: &WarehouseContext,
    sql: &str,
    output_format: OutputFormat,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    diagnostics::debug!("query_command called with sql: {sql}", sql);

    let session = context.open_warehouse().await?;
    let df = session
        .sql(sql)
        .await
        .map_err(|e| anyhow!("Failed to plan SQL query: {}", e))?;

    let mut stream = df
        .execute_stream()
        .await
        .map_err(|e| anyhow!("Failed to execute query: {}", e))?;

    match output_format {
        OutputFormat::Table => {
            let mut batches = Vec::new();
            while let Some(batch) = stream.next().await {
                let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                if batch.num_rows() > 0 {
                    batches.push(batch);
                }
            }

            if batches.is_empty() {
                handler("No results found.\n");
                return Ok(());
            }

            let formatted = datafusion::arrow::util::pretty::pretty_format_batches(&batches)
                .map_err(|e| anyhow!("Failed to format results as table: {}", e))?;
            handler(&format!("{formatted}\n"));
        }
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            {
                let mut csv_writer = WriterBuilder::new().with_header(true).build(&mut buffer);
                while let Some(batch) = stream.next().await {
                    let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                    csv_writer
                        .write(&batch)
                        .map_err(|e| anyhow!("Failed to write CSV: {}", e))?;
                }
            }
            handler(&String::from_utf8_lossy(&buffer));
        }
        OutputFormat::Count => {
            let mut total_rows = 0;
            while let Some(batch) = stream.next().await {
                let batch = batch.map_err(|e| anyhow!("Error in query stream: {}", e))?;
                total_rows += batch.num_rows();
            }
            handler(&format!("{total_rows}\n"));
        }
    }

    Ok(())
}
