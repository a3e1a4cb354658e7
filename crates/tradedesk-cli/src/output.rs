//! Stdout rendering. Logs go to stderr, so stdout only ever carries the
//! rendered result.

use std::io::{self, Write};

use serde_json::Value;
use tradedesk_core::Envelope;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(envelope: &Envelope<Value>, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let rendered = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(envelope)?,
        OutputFormat::Json => serde_json::to_string(envelope)?,
        OutputFormat::Table => table(envelope),
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;
    Ok(())
}

fn table(envelope: &Envelope<Value>) -> String {
    let mut rows = vec![
        (String::from("provenance"), envelope.meta.provenance.to_string()),
        (
            String::from("source_chain"),
            envelope
                .meta
                .source_chain
                .iter()
                .map(|provider| provider.as_str())
                .collect::<Vec<_>>()
                .join(" > "),
        ),
    ];
    flatten("", &envelope.data, &mut rows);
    for warning in &envelope.meta.warnings {
        rows.push((String::from("warning"), warning.clone()));
    }

    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value)| format!("{key:<width$} | {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn flatten(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, nested, rows);
            }
        }
        Value::Array(items) if items.iter().all(|item| !item.is_object()) => {
            let joined = items.iter().map(scalar).collect::<Vec<_>>().join(", ");
            rows.push((prefix.to_owned(), joined));
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{index}]"), item, rows);
            }
        }
        other => rows.push((prefix.to_owned(), scalar(other))),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::from("-"),
        other => other.to_string(),
    }
}
