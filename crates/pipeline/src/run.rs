// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Driving the pipeline end to end

use std::fmt;

use diagnostics::*;
use warehouse::{DataFrame, Session, WriteSummary};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::schema::{check_schema, revenue_schema, spend_schema};
use crate::transform;

pub const SPEND_PER_CHANNEL_TITLE: &str = "Total Spend per Year and Month For All Channels";
pub const SPEND_PER_MONTH_TITLE: &str = "Total Spend Across All Channels";
pub const REVENUE_PER_MONTH_TITLE: &str = "Total Revenue per Year and Month";
pub const SPEND_AND_REVENUE_TITLE: &str =
    "Total Spend and Revenue per Year and Month Across All Channels";

/// The lazy frames of every step. Building them reads only table metadata.
#[derive(Debug, Clone)]
pub struct PipelineFrames {
    pub spend_per_channel: DataFrame,
    pub spend_per_month: DataFrame,
    pub revenue_per_month: DataFrame,
    pub spend_and_revenue_per_month: DataFrame,
}

impl PipelineFrames {
    /// Frames in presentation order, with their titles
    #[must_use]
    pub fn stages(&self) -> [(&'static str, &DataFrame); 4] {
        [
            (SPEND_PER_CHANNEL_TITLE, &self.spend_per_channel),
            (SPEND_PER_MONTH_TITLE, &self.spend_per_month),
            (REVENUE_PER_MONTH_TITLE, &self.revenue_per_month),
            (SPEND_AND_REVENUE_TITLE, &self.spend_and_revenue_per_month),
        ]
    }
}

/// A titled preview of one intermediate frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub title: &'static str,
    pub preview: String,
}

/// Everything the run printed, plus what it wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub stages: Vec<Stage>,
    pub plan: Option<String>,
    pub write: Option<WriteSummary>,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            writeln!(f, "{}", stage.title)?;
            writeln!(f, "{}", stage.preview)?;
            writeln!(f)?;
        }
        if let Some(plan) = &self.plan {
            writeln!(f, "Query plan")?;
            writeln!(f, "{plan}")?;
        }
        if let Some(write) = &self.write {
            writeln!(f, "{write}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    /// Lazy frame of the saved result
    pub result: DataFrame,
    pub report: PipelineReport,
}

/// Read both source tables and chain the transformation steps.
pub async fn build(session: &Session, config: &PipelineConfig) -> Result<PipelineFrames> {
    config.validate()?;

    let spend = session.table(&config.spend_table).await?;
    check_schema(&spend, &config.spend_table, &spend_schema())?;

    let revenue = session.table(&config.revenue_table).await?;
    check_schema(&revenue, &config.revenue_table, &revenue_schema())?;

    let spend_per_channel = transform::spend_per_channel(spend)?;
    let spend_per_month = transform::spend_per_month(spend_per_channel.clone(), &config.channels)?;
    let revenue_per_month = transform::revenue_per_month(revenue)?;
    let spend_and_revenue_per_month =
        transform::spend_and_revenue_per_month(spend_per_month.clone(), revenue_per_month.clone())?;

    Ok(PipelineFrames {
        spend_per_channel,
        spend_per_month,
        revenue_per_month,
        spend_and_revenue_per_month,
    })
}

/// Build the pipeline, preview each step, optionally explain the final plan,
/// and save the result.
pub async fn run(session: &Session, config: &PipelineConfig) -> Result<PipelineOutput> {
    let frames = build(session, config).await?;

    let mut report = PipelineReport::default();
    for (title, frame) in frames.stages() {
        info!("Running stage {title}", title);
        let preview = warehouse::show(frame, config.show_rows).await?;
        report.stages.push(Stage { title, preview });
    }

    if config.explain {
        report.plan = Some(warehouse::explain(&frames.spend_and_revenue_per_month, false).await?);
    }

    let destination = config.destination_table.as_str();
    let summary = session
        .write(frames.spend_and_revenue_per_month.clone())
        .mode(config.write_mode()?)
        .save_as_table(destination)
        .await?;
    let rows = summary.rows;
    info!("Saved {rows} rows to {destination}", rows, destination);
    report.write = Some(summary);

    Ok(PipelineOutput {
        result: frames.spend_and_revenue_per_month,
        report,
    })
}
