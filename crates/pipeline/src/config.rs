// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Pipeline configuration
//!
//! Every field has a default, so an empty file (or no file) runs the standard
//! spend-and-revenue job. Example:
//! ```yaml
//! spend_table: campaign_spend
//! revenue_table: monthly_revenue
//! destination_table: SPEND_AND_REVENUE_PER_MONTH
//! channels: [search_engine, social_media, video, email]
//! show_rows: 10
//! write_mode: overwrite
//! explain: true
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use warehouse::{TableName, WriteMode};

use crate::error::{PipelineError, Result};
use crate::schema::{
    DEFAULT_CHANNELS, DESTINATION_TABLE, MONTH, REVENUE, REVENUE_TABLE, SPEND_TABLE, YEAR,
    channel_column,
};
use crate::transform::{REVENUE_MONTH, REVENUE_YEAR};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    /// Source of (DATE, CHANNEL, TOTAL_COST) rows
    pub spend_table: String,

    /// Source of (YEAR, MONTH, REVENUE) rows
    pub revenue_table: String,

    /// Table the joined result is saved to
    pub destination_table: String,

    /// Channel values pivoted into columns, in output order
    pub channels: Vec<String>,

    /// Rows printed for each intermediate frame
    pub show_rows: usize,

    /// overwrite, append, errorifexists or ignore
    pub write_mode: String,

    /// Include the query plan in the report
    pub explain: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            spend_table: SPEND_TABLE.to_string(),
            revenue_table: REVENUE_TABLE.to_string(),
            destination_table: DESTINATION_TABLE.to_string(),
            channels: DEFAULT_CHANNELS.iter().map(|c| (*c).to_string()).collect(),
            show_rows: 10,
            write_mode: WriteMode::Overwrite.to_string(),
            explain: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn write_mode(&self) -> Result<WriteMode> {
        Ok(self.write_mode.parse::<WriteMode>()?)
    }

    pub fn validate(&self) -> Result<()> {
        for table in [&self.spend_table, &self.revenue_table, &self.destination_table] {
            let _ = TableName::parse(table)?;
        }
        let _ = self.write_mode()?;

        if self.show_rows == 0 {
            return Err(PipelineError::InvalidConfig("show_rows must be at least 1".to_string()));
        }
        if self.channels.is_empty() {
            return Err(PipelineError::InvalidConfig("channels must not be empty".to_string()));
        }

        let reserved = [YEAR, MONTH, REVENUE, REVENUE_YEAR, REVENUE_MONTH];
        let mut columns = HashSet::new();
        for channel in &self.channels {
            if channel.trim().is_empty() {
                return Err(PipelineError::InvalidConfig("channel names must not be blank".to_string()));
            }
            let column = channel_column(channel);
            if reserved.contains(&column.as_str()) {
                return Err(PipelineError::InvalidConfig(format!(
                    "channel '{channel}' collides with output column {column}"
                )));
            }
            if !columns.insert(column.clone()) {
                return Err(PipelineError::InvalidConfig(format!(
                    "channel '{channel}' duplicates output column {column}"
                )));
            }
        }
        Ok(())
    }
}
