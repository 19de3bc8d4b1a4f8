// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Warehouse - named Delta tables behind a DataFusion session
//!
//! Tables are read as lazily evaluated DataFusion frames; nothing executes
//! until an action (`show`, `explain`, `save_as_table`, `collect`) runs.

mod display;
mod error;
mod identifier;
mod session;
mod writer;

pub use display::{explain, show};
pub use error::{Result, WarehouseError};
pub use identifier::TableName;
pub use session::Session;
pub use writer::{DataFrameWriter, WriteMode, WriteSummary};

// Frames are DataFusion's; re-export so callers share one version
pub use datafusion::dataframe::DataFrame;
