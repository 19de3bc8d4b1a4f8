// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The four reshaping steps between the source tables and the destination.
//! Each step only extends the logical plan; nothing executes here.

use arrow_schema::DataType;
use datafusion::functions::expr_fn::date_part;
use datafusion::functions_aggregate::expr_fn::sum;
use datafusion::logical_expr::{Expr, JoinType, SortExpr, cast, ident, lit};
use warehouse::DataFrame;

use crate::error::Result;
use crate::pivot::pivot;
use crate::schema::{CHANNEL, DATE, MONTH, REVENUE, TOTAL_COST, YEAR, channel_column};

/// Revenue-side join keys, renamed so both inputs keep distinct column names
pub(crate) const REVENUE_YEAR: &str = "REVENUE_YEAR";
pub(crate) const REVENUE_MONTH: &str = "REVENUE_MONTH";

fn by_year_month() -> Vec<SortExpr> {
    vec![ident(YEAR).sort(true, false), ident(MONTH).sort(true, false)]
}

fn date_field(part: &str) -> Expr {
    cast(date_part(lit(part), ident(DATE)), DataType::Int32)
}

/// Total cost per (YEAR, MONTH, CHANNEL).
pub fn spend_per_channel(spend: DataFrame) -> Result<DataFrame> {
    let mut order = by_year_month();
    order.push(ident(CHANNEL).sort(true, false));

    Ok(spend
        .aggregate(
            vec![
                date_field("year").alias(YEAR),
                date_field("month").alias(MONTH),
                ident(CHANNEL),
            ],
            vec![sum(ident(TOTAL_COST)).alias(TOTAL_COST)],
        )?
        .sort(order)?)
}

/// One row per (YEAR, MONTH) with a cost column per channel, in `channels`
/// order. Channels with no spend in a month are NULL.
pub fn spend_per_month(spend_per_channel: DataFrame, channels: &[String]) -> Result<DataFrame> {
    let wide = pivot(spend_per_channel, &[YEAR, MONTH], CHANNEL, channels, TOTAL_COST)?;

    let mut projection = vec![ident(YEAR), ident(MONTH)];
    projection.extend(
        channels
            .iter()
            .map(|channel| ident(channel.as_str()).alias(channel_column(channel))),
    );

    Ok(wide.select(projection)?.sort(by_year_month())?)
}

/// Total revenue per (YEAR, MONTH).
pub fn revenue_per_month(revenue: DataFrame) -> Result<DataFrame> {
    Ok(revenue
        .aggregate(
            vec![ident(YEAR), ident(MONTH)],
            vec![sum(ident(REVENUE)).alias(REVENUE)],
        )?
        .sort(by_year_month())?)
}

/// Inner join of monthly spend and revenue on (YEAR, MONTH). The output has a
/// single YEAR and MONTH, then the spend columns, then REVENUE.
pub fn spend_and_revenue_per_month(
    spend_per_month: DataFrame,
    revenue_per_month: DataFrame,
) -> Result<DataFrame> {
    let spend_columns: Vec<String> = spend_per_month
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .filter(|name| name != YEAR && name != MONTH)
        .collect();

    let revenue = revenue_per_month.select(vec![
        ident(YEAR).alias(REVENUE_YEAR),
        ident(MONTH).alias(REVENUE_MONTH),
        ident(REVENUE),
    ])?;

    let joined = spend_per_month.join_on(
        revenue,
        JoinType::Inner,
        [
            ident(YEAR).eq(ident(REVENUE_YEAR)),
            ident(MONTH).eq(ident(REVENUE_MONTH)),
        ],
    )?;

    let mut projection = vec![ident(YEAR), ident(MONTH)];
    projection.extend(spend_columns.iter().map(|name| ident(name.as_str())));
    projection.push(ident(REVENUE));

    Ok(joined.select(projection)?.sort(by_year_month())?)
}
