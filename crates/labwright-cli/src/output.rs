//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use labwright_domain::CatalogItem;
use labwright_resolver::{Bom, GraphWarning, HierarchyNode, LineStatus, ResolutionOutcome};
use labwright_store::ItemRecord;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a list of catalog items.
    pub fn format_items(&self, items: &[&CatalogItem]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let records: Vec<ItemRecord> = items.iter().map(|item| ItemRecord::from_item(item)).collect();
                Ok(serde_json::to_string_pretty(&records)?)
            }
            OutputFormat::Tree => Ok(items
                .iter()
                .map(|item| format!("{} [{}]", item.name, item.category))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => self.format_items_table(items),
        }
    }

    fn format_items_table(&self, items: &[&CatalogItem]) -> Result<String> {
        if items.is_empty() {
            return Ok(self.colorize("No items found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Name", "Category", "Requires", "Attributes"]);

        for item in items {
            let requires = item
                .resolvable_slots()
                .map(|slot| format!("{} x{}", slot.role, slot.quantity))
                .collect::<Vec<_>>()
                .join(", ");
            let attributes = item
                .attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, display_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            builder.push_record([
                item.name.as_str(),
                item.category.as_str(),
                requires.as_str(),
                attributes.as_str(),
            ]);
        }

        Ok(self.finish_table(builder))
    }

    /// Format an unresolved dependency hierarchy.
    pub fn format_hierarchy(&self, hierarchy: &HierarchyNode) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(hierarchy)?),
            OutputFormat::Table | OutputFormat::Tree => Ok(hierarchy.render().trim_end().to_string()),
        }
    }

    /// Format the result of a resolution run.
    pub fn format_outcome(&self, outcome: &ResolutionOutcome) -> Result<String> {
        let bom = outcome.bom();
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "run_id": outcome.run_id.to_string(),
                    "complete": bom.is_complete(),
                    "stats": outcome.stats,
                    "tree": outcome.tree,
                    "bom": bom,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Tree => Ok(format!(
                "{}\n{}",
                outcome.tree.render().trim_end(),
                self.summary(&bom)
            )),
            OutputFormat::Table => Ok(format!(
                "{}\n\n{}\n{}",
                outcome.tree.render().trim_end(),
                self.format_bom_table(&bom),
                self.summary(&bom)
            )),
        }
    }

    /// Format a bill of materials as a table.
    pub fn format_bom_table(&self, bom: &Bom) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Item", "Category", "Qty", "Status", "Required by"]);

        for line in &bom.lines {
            let category = line.category.as_ref().map(|c| c.to_string()).unwrap_or_default();
            let status = match &line.status {
                LineStatus::Resolved => "ok".to_string(),
                LineStatus::Unresolved { reason } => format!("UNRESOLVED: {}", reason),
            };
            let paths = line
                .provenance
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            builder.push_record([
                line.item.clone(),
                category,
                line.quantity.to_string(),
                status,
                paths,
            ]);
        }

        self.finish_table(builder)
    }

    fn summary(&self, bom: &Bom) -> String {
        let gaps = bom.unresolved().count();
        if gaps == 0 {
            self.success(&format!("Resolved {} ({} line(s))", bom.root, bom.lines.len()))
        } else {
            self.warning(&format!("{} resolved with {} unresolved line(s)", bom.root, gaps))
        }
    }

    /// Format catalog structure warnings.
    pub fn format_warnings(&self, warnings: &[GraphWarning]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(warnings)?),
            OutputFormat::Table | OutputFormat::Tree => {
                if warnings.is_empty() {
                    return Ok(self.success("No cycles or dangling references"));
                }
                Ok(warnings
                    .iter()
                    .map(|w| self.warning(&w.to_string()))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn finish_table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Attribute values without JSON quoting for plain strings.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
