// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod explain;
pub mod load;
pub mod query;
pub mod run;
pub mod show;
pub mod tables;

pub use explain::explain_command;
pub use load::load_command;
pub use query::query_command;
pub use run::run_command;
pub use show::show_command;
pub use tables::tables_command;
