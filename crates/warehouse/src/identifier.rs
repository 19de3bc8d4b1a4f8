// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Table identifiers
//!
//! Unquoted names are case-insensitive and stored upper-cased, so
//! `campaign_spend` and `CAMPAIGN_SPEND` resolve to the same table. A
//! double-quoted name keeps its exact spelling. The normalized name doubles as
//! the table's directory inside the warehouse root.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WarehouseError};

/// Longest identifier accepted, in bytes
const MAX_IDENTIFIER_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WarehouseError::invalid_identifier(raw, "empty name"));
        }

        let name = if let Some(inner) = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Self::parse_quoted(raw, inner)?
        } else {
            Self::parse_unquoted(raw, trimmed)?
        };

        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(WarehouseError::invalid_identifier(raw, "name too long"));
        }
        Ok(TableName(name))
    }

    fn parse_quoted(raw: &str, inner: &str) -> Result<String> {
        if inner.is_empty() {
            return Err(WarehouseError::invalid_identifier(raw, "empty quoted name"));
        }
        // Quoted names become directory names, so path syntax is rejected
        if inner.contains(['/', '\\', '"']) || inner == "." || inner == ".." {
            return Err(WarehouseError::invalid_identifier(
                raw,
                "quoted name contains a path separator or quote",
            ));
        }
        Ok(inner.to_string())
    }

    fn parse_unquoted(raw: &str, name: &str) -> Result<String> {
        let mut chars = name.chars();
        let first = chars.next().unwrap_or_default();
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(WarehouseError::invalid_identifier(
                raw,
                "must start with a letter or underscore",
            ));
        }
        if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$')) {
            return Err(WarehouseError::invalid_identifier(
                raw,
                format!("unexpected character '{bad}'"),
            ));
        }
        Ok(name.to_ascii_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableName {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
