// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Spend and revenue per month
//!
//! Reads daily campaign spend and monthly revenue, totals spend per month and
//! channel, pivots channels into columns, joins revenue on (YEAR, MONTH), and
//! saves the result, overwriting the destination table on every run.

pub mod config;
mod error;
pub mod pivot;
pub mod run;
pub mod schema;
pub mod transform;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use run::{PipelineFrames, PipelineOutput, PipelineReport, Stage, build, run};
