// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Long-to-wide pivot over a lazy frame
//!
//! DataFusion has no pivot operator, so each listed category becomes a
//! conditional aggregate:
//!
//! ```text
//! SELECT index..., SUM(CASE WHEN pivot = 'v1' THEN value END) AS "v1", ...
//! GROUP BY index...
//! ```
//!
//! Categories missing from `values` are dropped; a category with no rows in a
//! group yields NULL.

use std::collections::HashSet;

use datafusion::functions_aggregate::expr_fn::sum;
use datafusion::logical_expr::{Expr, ident, lit, when};
use warehouse::DataFrame;

use crate::error::{PipelineError, Result};

/// Pivot `pivot_column` into one summed `value_column` per entry of `values`,
/// grouped by `index`. Output columns are named by the category value.
pub fn pivot(
    frame: DataFrame,
    index: &[&str],
    pivot_column: &str,
    values: &[String],
    value_column: &str,
) -> Result<DataFrame> {
    if values.is_empty() {
        return Err(PipelineError::InvalidPivot(format!(
            "no values listed for pivot column {pivot_column}"
        )));
    }

    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(PipelineError::InvalidPivot(format!(
                "value '{value}' listed more than once"
            )));
        }
        if index.contains(&value.as_str()) {
            return Err(PipelineError::InvalidPivot(format!(
                "value '{value}' collides with an index column"
            )));
        }
    }

    let group_by: Vec<Expr> = index.iter().map(|name| ident(*name)).collect();

    let mut aggregates = Vec::with_capacity(values.len());
    for value in values {
        let matching = when(
            ident(pivot_column).eq(lit(value.as_str())),
            ident(value_column),
        )
        .end()?;
        aggregates.push(sum(matching).alias(value.as_str()));
    }

    Ok(frame.aggregate(group_by, aggregates)?)
}
