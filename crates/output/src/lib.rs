use std::collections::BTreeSet;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

const ISSUE_HEADERS: [&str; 5] = ["key", "status", "priority", "assignee", "summary"];

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
    Csv,
    Quiet,
}

type Rows = (Vec<String>, Vec<Vec<String>>);

pub struct OutputRenderer {
    format: OutputFormat,
}

impl OutputRenderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Print any serializable value in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        let rows = Self::coerce_rows(&json_value);
        self.emit(&json_value, rows)
    }

    /// Print a search response. Tabular formats show one row per issue;
    /// responses without an `issues` array fall back to JSON.
    pub fn render_search(&self, response: &Value) -> Result<()> {
        let rows = Self::issue_rows(response);
        self.emit(response, rows)
    }

    fn emit(&self, value: &Value, rows: Option<Rows>) -> Result<()> {
        match (self.format, rows) {
            (OutputFormat::Json, _) => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            (OutputFormat::Yaml, _) => {
                println!("{}", serde_yaml::to_string(value)?);
            }
            (OutputFormat::Table, Some((headers, rows))) => {
                println!("{}", Self::table(headers, rows));
            }
            (OutputFormat::Csv, Some((headers, rows))) => {
                print!("{}", Self::csv(&headers, &rows)?);
            }
            (OutputFormat::Quiet, Some((headers, rows))) => {
                let column = Self::identifier_column(&headers);
                for row in rows {
                    if let Some(cell) = row.get(column) {
                        println!("{cell}");
                    }
                }
            }
            _ => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
        }

        Ok(())
    }

    /// Column printed by the quiet format.
    fn identifier_column(headers: &[String]) -> usize {
        ["key", "id", "name"]
            .iter()
            .find_map(|wanted| headers.iter().position(|h| h == wanted))
            .unwrap_or(0)
    }

    fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in rows {
            builder.push_record(row);
        }
        builder.build().with(Style::rounded()).to_string()
    }

    fn csv(headers: &[String], rows: &[Vec<String>]) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| anyhow!("Failed to flush CSV output: {}", err.error()))?;
        Ok(String::from_utf8(bytes)?)
    }

    fn issue_rows(response: &Value) -> Option<Rows> {
        let issues = response.get("issues")?.as_array()?;

        let headers = ISSUE_HEADERS.iter().map(|h| h.to_string()).collect();
        let rows = issues
            .iter()
            .map(|issue| {
                let fields = &issue["fields"];
                vec![
                    Self::value_to_string(&issue["key"]),
                    Self::named(&fields["status"], "name"),
                    Self::named(&fields["priority"], "name"),
                    Self::named(&fields["assignee"], "displayName"),
                    Self::value_to_string(&fields["summary"]),
                ]
            })
            .collect();

        Some((headers, rows))
    }

    /// `{"name": "Open"}` style objects collapse to their label.
    fn named(value: &Value, label: &str) -> String {
        match value.get(label) {
            Some(inner) => Self::value_to_string(inner),
            None => Self::value_to_string(value),
        }
    }

    fn coerce_rows(value: &Value) -> Option<Rows> {
        let rows = match value {
            Value::Array(rows) if !rows.is_empty() => rows,
            _ => return None,
        };

        let mut headers = BTreeSet::new();
        for row in rows {
            if let Value::Object(obj) = row {
                headers.extend(obj.keys().cloned());
            }
        }

        if headers.is_empty() {
            return None;
        }

        let headers_vec: Vec<String> = headers.into_iter().collect();
        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = Vec::with_capacity(headers_vec.len());
            if let Value::Object(obj) = row {
                for header in &headers_vec {
                    let cell = obj
                        .get(header)
                        .map(Self::value_to_string)
                        .unwrap_or_default();
                    record.push(cell);
                }
            }
            data.push(record);
        }

        Some((headers_vec, data))
    }

    fn value_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}
