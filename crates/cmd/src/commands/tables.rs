// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::WarehouseContext;

/// List the tables in the warehouse, one per line
pub async fn tables_command<F>(context: &WarehouseContext, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let session = context.open_warehouse().await?;
    for name in session.table_names().await? {
        handler(&format!("{name}\n"));
    }
    Ok(())
}
