// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Source and destination table layouts

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};
use warehouse::{DataFrame, TableName};

use crate::error::{PipelineError, Result};

pub const SPEND_TABLE: &str = "campaign_spend";
pub const REVENUE_TABLE: &str = "monthly_revenue";
pub const DESTINATION_TABLE: &str = "SPEND_AND_REVENUE_PER_MONTH";

pub const DATE: &str = "DATE";
pub const CHANNEL: &str = "CHANNEL";
pub const TOTAL_COST: &str = "TOTAL_COST";
pub const YEAR: &str = "YEAR";
pub const MONTH: &str = "MONTH";
pub const REVENUE: &str = "REVENUE";

/// Ad channels pivoted into columns, in output order
pub const DEFAULT_CHANNELS: [&str; 4] = ["search_engine", "social_media", "video", "email"];

/// Daily spend per channel: (DATE, CHANNEL, TOTAL_COST)
#[must_use]
pub fn spend_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(DATE, DataType::Date32, false),
        Field::new(CHANNEL, DataType::Utf8, false),
        Field::new(TOTAL_COST, DataType::Float64, true),
    ]))
}

/// Revenue per month: (YEAR, MONTH, REVENUE)
#[must_use]
pub fn revenue_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(YEAR, DataType::Int32, false),
        Field::new(MONTH, DataType::Int32, false),
        Field::new(REVENUE, DataType::Float64, true),
    ]))
}

/// Schema for one of the two source tables, if `name` is one of them.
#[must_use]
pub fn known_schema(name: &TableName) -> Option<SchemaRef> {
    let spend = TableName::parse(SPEND_TABLE).ok()?;
    let revenue = TableName::parse(REVENUE_TABLE).ok()?;
    if *name == spend {
        Some(spend_schema())
    } else if *name == revenue {
        Some(revenue_schema())
    } else {
        None
    }
}

/// Output column for a pivoted channel value
#[must_use]
pub fn channel_column(channel: &str) -> String {
    channel.to_ascii_uppercase()
}

/// Whether a stored column can stand in for the expected type. Dates may be
/// any date or timestamp, keys any integer width, amounts any numeric type.
fn compatible(expected: &DataType, found: &DataType) -> bool {
    match expected {
        DataType::Date32 => matches!(
            found,
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _)
        ),
        DataType::Utf8 => matches!(
            found,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
        ),
        DataType::Int32 => found.is_integer(),
        DataType::Float64 => found.is_numeric(),
        other => other == found,
    }
}

/// Fail listing every column of `expected` that `frame` lacks or stores with
/// an unusable type.
pub fn check_schema(frame: &DataFrame, table: &str, expected: &Schema) -> Result<()> {
    let schema = frame.schema();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for field in expected.fields() {
        match schema.fields().iter().find(|f| f.name() == field.name()) {
            None => missing.push(field.name().clone()),
            Some(found) if !compatible(field.data_type(), found.data_type()) => {
                mismatched.push(format!(
                    "{} (expected {}, found {})",
                    field.name(),
                    field.data_type(),
                    found.data_type()
                ));
            }
            Some(_) => {}
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch {
            table: table.to_string(),
            missing,
            mismatched,
        })
    }
}
