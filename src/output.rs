use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Format {
    Json,
    Table,
    Plain,
}

impl Format {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "table" => Format::Table,
            "plain" => Format::Plain,
            _ => Format::Json,
        }
    }
}

/// Where command results and diagnostics go.
pub trait Printer: Send + Sync {
    /// Print a result document on stdout.
    fn print(&self, value: &Value) -> Result<()>;

    /// A note on stderr that does not fail the command.
    fn warn(&self, msg: &str);

    fn success(&self, msg: &str);
}

/// Serialize `value` and hand it to `printer`.
pub fn emit<T: Serialize + ?Sized>(printer: &dyn Printer, value: &T) -> Result<()> {
    printer.print(&serde_json::to_value(value)?)
}

pub struct StdPrinter {
    pub format: Format,
}

impl StdPrinter {
    pub fn new(format: Format) -> Self {
        Self { format }
    }
}

impl Printer for StdPrinter {
    fn print(&self, value: &Value) -> Result<()> {
        println!("{}", render(value, &self.format)?);
        Ok(())
    }

    fn warn(&self, msg: &str) {
        eprintln!("{} {}", "WARN".yellow().bold(), msg);
    }

    fn success(&self, msg: &str) {
        eprintln!("{} {}", "OK".green().bold(), msg);
    }
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "ERROR".red().bold(), msg);
}

pub fn render(value: &Value, format: &Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Table => render_table(value),
        Format::Plain => {
            let mut lines = Vec::new();
            render_plain(value, &mut lines);
            lines.join("\n")
        }
    })
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) => render_rows(items),
        Value::Object(obj) => {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);
            obj.iter()
                .map(|(key, val)| {
                    format!(
                        "{:>width$}  {}",
                        key.bold(),
                        truncate(format_cell(val), 80),
                        width = max_key_len
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        other => format_cell(other),
    }
}

fn render_rows(items: &[Value]) -> String {
    let Some(first) = items.first() else {
        return "(empty)".to_string();
    };
    let Value::Object(first_obj) = first else {
        return items.iter().map(format_cell).collect::<Vec<_>>().join("\n");
    };

    // nested values do not fit a column
    let keys: Vec<&String> = first_obj
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Array(_) | Value::Object(_)))
        .map(|(k, _)| k)
        .collect();
    if keys.is_empty() {
        return "(no scalar fields)".to_string();
    }

    let cells: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            keys.iter()
                .map(|key| truncate(format_cell(item.get(key.as_str()).unwrap_or(&Value::Null)), 40))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = keys.iter().map(|k| k.len()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header: Vec<String> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| format!("{:width$}", k.to_uppercase(), width = widths[i]))
        .collect();
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut lines = vec![
        header.join("  ").bold().to_string(),
        sep.join("  ").dimmed().to_string(),
    ];
    for row in cells {
        let padded: Vec<String> = row
            .into_iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
            .collect();
        lines.push(padded.join("  ").trim_end().to_string());
    }
    lines.join("\n")
}

fn render_plain(value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                render_plain(item, lines);
            }
        }
        Value::Object(obj) => {
            for (key, val) in obj {
                lines.push(format!("{}={}", key, format_cell(val)));
            }
        }
        Value::Null => lines.push("null".to_string()),
        other => lines.push(format_cell(other)),
    }
}

fn truncate(cell: String, max: usize) -> String {
    if cell.chars().count() > max {
        let kept: String = cell.chars().take(max - 3).collect();
        format!("{kept}...")
    } else {
        cell
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(a) => format!("[{} items]", a.len()),
        Value::Object(_) => "{...}".to_string(),
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps everything a command printed.
    #[derive(Default)]
    pub struct CapturePrinter {
        pub printed: Mutex<Vec<Value>>,
        pub warnings: Mutex<Vec<String>>,
    }

    impl CapturePrinter {
        pub fn printed(&self) -> Vec<Value> {
            self.printed.lock().unwrap().clone()
        }

        pub fn warnings(&self) -> Vec<String> {
            self.warnings.lock().unwrap().clone()
        }
    }

    impl Printer for CapturePrinter {
        fn print(&self, value: &Value) -> Result<()> {
            self.printed.lock().unwrap().push(value.clone());
            Ok(())
        }

        fn warn(&self, msg: &str) {
            self.warnings.lock().unwrap().push(msg.to_string());
        }

        fn success(&self, _msg: &str) {}
    }
}
