// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Rendering actions: previews and query plans
//!
//! Both functions execute work against a clone of the frame, so the caller's
//! lazy frame stays usable afterwards.

use std::fmt::Write as _;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_array::cast::AsArray;
use arrow::util::pretty::pretty_format_batches;
use datafusion::dataframe::DataFrame;

use crate::error::Result;

/// Render the first `rows` rows of `frame` as an ASCII table. An empty
/// result still shows the header.
pub async fn show(frame: &DataFrame, rows: usize) -> Result<String> {
    let schema = Arc::clone(frame.schema().inner());
    let mut batches = frame.clone().limit(0, Some(rows))?.collect().await?;
    batches.retain(|batch| batch.num_rows() > 0);
    if batches.is_empty() {
        batches.push(RecordBatch::new_empty(schema));
    }
    Ok(pretty_format_batches(&batches)?.to_string())
}

/// Render the logical and physical plans of `frame`.
pub async fn explain(frame: &DataFrame, verbose: bool) -> Result<String> {
    let batches = frame.clone().explain(verbose, false)?.collect().await?;

    let mut out = String::new();
    for batch in &batches {
        let (Some(kinds), Some(plans)) = (
            batch.column(0).as_string_opt::<i32>(),
            batch.column(1).as_string_opt::<i32>(),
        ) else {
            // Unexpected explain layout, fall back to the generic table
            return Ok(pretty_format_batches(&batches)?.to_string());
        };
        for row in 0..batch.num_rows() {
            _ = writeln!(out, "{}:", kinds.value(row));
            for line in plans.value(row).lines() {
                _ = writeln!(out, "  {line}");
            }
        }
    }
    Ok(out)
}
