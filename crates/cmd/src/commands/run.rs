// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Run command - executes the spend and revenue pipeline
//!
//! Example:
//!   adspend --warehouse ./wh run --config pipeline.yaml

use std::path::Path;

use anyhow::{Context, Result};

use crate::common::{WarehouseContext, load_config};

/// Run the pipeline and hand the printed report to `handler`
pub async fn run_command<F>(
    context: &WarehouseContext,
    config_path: Option<&Path>,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let config = load_config(config_path)?;
    let session = context.open_warehouse().await?;

    let destination = config.destination_table.as_str();
    diagnostics::info!("Running pipeline into {destination}", destination);

    let output = pipeline::run(&session, &config)
        .await
        .with_context(|| format!("Pipeline failed writing {destination}"))?;

    handler(&output.report.to_string());
    Ok(())
}
