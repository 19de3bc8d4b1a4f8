// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::Result;

use crate::common::{WarehouseContext, load_config};

/// Build the pipeline without writing anything and print the final query plan
pub async fn explain_command<F>(
    context: &WarehouseContext,
    config_path: Option<&Path>,
    verbose: bool,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let config = load_config(config_path)?;
    let session = context.open_warehouse().await?;

    let frames = pipeline::build(&session, &config).await?;
    let plan = warehouse::explain(&frames.spend_and_revenue_per_month, verbose).await?;

    handler(&plan);
    Ok(())
}
