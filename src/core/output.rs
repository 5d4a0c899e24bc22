//! Output rendering for CLI surfaces.
//!
//! Every listing and report is a sequence of typed rows with header labels.
//! Text mode prints `a | b | c` lines under a header; JSON mode wraps the rows
//! in a command envelope.

use crate::core::time;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A row type that can be rendered as a table line.
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// Untyped rows with dynamic headers, for caller-chosen projections.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_rows<T: Tabular>(rows: &[T]) -> Self {
        Self {
            headers: T::headers().iter().map(|h| h.to_string()).collect(),
            rows: rows.iter().map(Tabular::cells).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as text lines. An empty table renders the no-match message.
    pub fn render_text(&self) -> String {
        if self.rows.is_empty() {
            return "No matches found for selected criteria.".to_string();
        }
        let header = self.headers.join(" | ");
        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');
        out.push_str(&"-".repeat(header.chars().count()));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        out
    }

    pub fn render_json(&self, cmd: &str) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|c| serde_json::Value::String(c.clone())))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();
        let status = if rows.is_empty() { "no_rows" } else { "ok" };
        time::command_envelope(cmd, status, serde_json::json!({ "rows": rows }))
    }
}

pub fn print_table(table: &Table, cmd: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", table.render_text()),
        OutputFormat::Json => println!("{}", table.render_json(cmd)),
    }
}

pub fn print_rows<T: Tabular>(rows: &[T], cmd: &str, format: OutputFormat) {
    print_table(&Table::from_rows(rows), cmd, format);
}

/// Report a completed write. `rows == 0` is a normal no-op, not an error.
pub fn print_write(cmd: &str, rows: usize, message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            if rows == 0 {
                println!("{} {}", "•".bright_yellow(), message);
            } else {
                println!("{} {}", "✓".bright_green(), message);
            }
        }
        OutputFormat::Json => {
            let status = if rows == 0 { "no_match" } else { "ok" };
            println!(
                "{}",
                time::command_envelope(
                    cmd,
                    status,
                    serde_json::json!({ "rows_affected": rows, "message": message })
                )
            );
        }
    }
}

pub fn print_error(err: &dyn std::fmt::Display) {
    eprintln!("{} {}", "✗".bright_red(), err);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".bright_yellow(), message);
}
