use clap::ValueEnum;
use comfy_table::{presets, modifiers, Attribute, Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// Console output for the administrative commands
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            _ => self.print_json(&json!({ "type": "success", "message": msg.as_ref() })),
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Shown even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            _ => self.print_json(&json!({ "type": "error", "message": msg.as_ref() })),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            _ => self.print_json(&json!({ "type": "info", "message": msg.as_ref() })),
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            _ => self.print_json(&json!({ "type": "warning", "message": msg.as_ref() })),
        }
    }

    /// Render rows as a table in human mode, or as an array of objects keyed by header
    pub fn table(&self, headers: &[&str], rows: Vec<Vec<String>>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                let mut table = Table::new();
                table.load_preset(presets::UTF8_FULL);
                table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
                table.set_header(headers.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
                for row in rows {
                    table.add_row(row);
                }
                println!("{}", table);
            }
            _ => {
                let items: Vec<serde_json::Value> = rows
                    .into_iter()
                    .map(|row| {
                        let object: serde_json::Map<String, serde_json::Value> = headers
                            .iter()
                            .zip(row)
                            .map(|(header, value)| (header.to_lowercase(), json!(value)))
                            .collect();
                        serde_json::Value::Object(object)
                    })
                    .collect();
                self.print_json(&serde_json::Value::Array(items));
            }
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            _ => println!("{}", serde_json::to_string(data).unwrap_or_default()),
        }
    }
}
