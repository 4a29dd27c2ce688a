// Output formatting for CLI

use std::io::{self, Write};

use serde_json::{Map, Value};
use tagscan::{ScanOutput, ScannerKind};

use crate::cli::{CliResult, OutputFormat};

/// Flatten a scan result into the JSON object every format prints.
///
/// Art is summarised as MIME type and size unless `with_art` is set.
pub fn file_report(path: &str, kind: ScannerKind, output: &ScanOutput, with_art: bool) -> CliResult<Value> {
    let mut report = Map::new();
    report.insert("path".to_string(), Value::from(path));
    report.insert("format".to_string(), Value::from(kind.name()));

    if let Value::Object(tag) = serde_json::to_value(&output.tag)? {
        report.extend(tag);
    }

    match &output.art {
        Some(art) if with_art => {
            report.insert("art".to_string(), serde_json::to_value(art)?);
        }
        Some(art) => {
            report.insert("art_mime_type".to_string(), Value::from(art.mime_type.as_str()));
            report.insert("art_size".to_string(), Value::from(art.bytes.len()));
        }
        None => {}
    }
    Ok(Value::Object(report))
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Output metadata
    pub fn output_metadata(&self, metadata: &Value, writer: &mut dyn Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(metadata)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(metadata)?)?;
            }
            OutputFormat::KeyValue => {
                self.output_key_value(metadata, writer)?;
            }
            OutputFormat::Table => {
                self.output_table(metadata, writer)?;
            }
        }
        Ok(())
    }

    /// Output as key-value pairs
    fn output_key_value(&self, metadata: &Value, writer: &mut dyn Write) -> CliResult<()> {
        if let Some(obj) = metadata.as_object() {
            let mut items: Vec<_> = obj.iter().collect();
            items.sort_by(|a, b| a.0.cmp(b.0));

            for (key, value) in items {
                writeln!(writer, "{}: {}", key, format_value(value))?;
            }
        }
        Ok(())
    }

    /// Output as table
    fn output_table(&self, metadata: &Value, writer: &mut dyn Write) -> CliResult<()> {
        if let Some(obj) = metadata.as_object() {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
            for (key, value) in obj {
                writeln!(
                    writer,
                    "{:<width$}{}",
                    format!("{}:", key),
                    format_value(value),
                    width = max_key_len + 2
                )?;
            }
            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        }
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

/// Format a JSON value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "(null)".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(arr) => {
            if arr.is_empty() {
                "[]".to_string()
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                "{}".to_string()
            } else {
                format!("{{{} items}}", obj.len())
            }
        }
    }
}

/// Progress indicator for batch operations, drawn on stderr
pub struct ProgressBar {
    total: usize,
    current: usize,
    show: bool,
}

impl ProgressBar {
    pub fn new(total: usize, show: bool) -> Self {
        Self {
            total,
            current: 0,
            show,
        }
    }

    pub fn increment(&mut self, label: &str) {
        self.current += 1;
        if self.show && self.total > 0 {
            let percent = (self.current * 100) / self.total;
            let mut err = io::stderr().lock();
            write!(err, "\r\x1b[2K[{}/{}] ({}%) {}", self.current, self.total, percent, label).ok();
            if self.current == self.total {
                writeln!(err).ok();
            }
            err.flush().ok();
        }
    }
}
