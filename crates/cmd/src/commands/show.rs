// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::WarehouseContext;

/// Print the first `rows` rows of a table
pub async fn show_command<F>(
    context: &WarehouseContext,
    table: &str,
    rows: usize,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let session = context.open_warehouse().await?;
    let frame = session.table(table).await?;
    let rendered = warehouse::show(&frame, rows).await?;
    handler(&format!("{rendered}\n"));
    Ok(())
}
