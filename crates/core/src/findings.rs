// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Findings recorded in an archived fuzz artifact.
//!
//! The fuzz tool writes a JSON document whose `command_results` array holds
//! one entry per command it executed against the plugin. Everything else in
//! the document is left untouched; only these rows are modelled here.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// CSV header written by [`Findings::write_csv`]
pub const CSV_HEADER: [&str; 5] = ["cmd", "object_name", "return_code", "stdout", "stderr"];

/// One command executed by the fuzz tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandResult {
    pub cmd: String,
    pub object_name: String,
    pub return_code: Option<i64>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// Build a row field by field. Missing and `null` fields are empty, and
    /// other non-string values keep their JSON text. A `return_code` that is
    /// neither an integer nor an integer string is left unset.
    pub fn from_row(row: &Map<String, Value>) -> Self {
        let return_code = match row.get("return_code") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Self {
            cmd: text(row.get("cmd")),
            object_name: text(row.get("object_name")),
            return_code,
            stdout: text(row.get("stdout")),
            stderr: text(row.get("stderr")),
        }
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    #[serde(default)]
    pub command_results: Vec<CommandResult>,
}

impl Findings {
    /// Extract findings from an archived artifact.
    ///
    /// Rows that are not objects are skipped, and a document without
    /// `command_results` yields no rows rather than an error. Fields of the
    /// wrong type never drop a row: see [`CommandResult::from_row`].
    pub fn from_value(value: &Value) -> Self {
        let command_results = value
            .get("command_results")
            .and_then(|v| v.as_array())
            .map(|rows| {
                rows.iter().filter_map(|row| row.as_object()).map(CommandResult::from_row).collect()
            })
            .unwrap_or_default();
        Self { command_results }
    }

    pub fn is_empty(&self) -> bool {
        self.command_results.is_empty()
    }

    /// Write the rows as RFC 4180 CSV, header first.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        write_csv_row(&mut out, CSV_HEADER.iter().copied())?;
        for row in &self.command_results {
            let code = row.return_code.map(|c| c.to_string()).unwrap_or_default();
            write_csv_row(
                &mut out,
                [
                    row.cmd.as_str(),
                    row.object_name.as_str(),
                    code.as_str(),
                    row.stdout.as_str(),
                    row.stderr.as_str(),
                ],
            )?;
        }
        Ok(())
    }
}

fn write_csv_row<'a, W: Write>(out: &mut W, fields: impl IntoIterator<Item = &'a str>) -> io::Result<()> {
    let mut first = true;
    for field in fields {
        if !first {
            out.write_all(b",")?;
        }
        first = false;
        if field.contains([',', '"', '\n', '\r']) {
            write!(out, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            out.write_all(field.as_bytes())?;
        }
    }
    out.write_all(b"\r\n")
}

#[cfg(test)]
#[path = "findings_tests.rs"]
mod tests;
