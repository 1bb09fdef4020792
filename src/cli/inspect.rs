use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::OutputFormat;
use crate::mapping;
use crate::model::RenameTables;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub classes: usize,
    pub fields: usize,
    pub methods: usize,
    pub methods_with_locals: usize,
}

#[derive(Debug, Serialize)]
struct ClassRename<'a> {
    from: &'a str,
    to: &'a str,
}

pub fn load(path: &Path, from: &str, to: &str) -> Result<RenameTables> {
    let mut tables = RenameTables::new();
    mapping::read_path(path, from, to, &mut tables)
        .with_context(|| format!("reading mappings from {}", path.display()))?;
    Ok(tables)
}

pub fn format_summary(tables: &RenameTables, format: OutputFormat) -> Result<String> {
    let summary = Summary {
        classes: tables.classes.len(),
        fields: tables.fields.len(),
        methods: tables.methods.len(),
        methods_with_locals: tables.locals.len(),
    };

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
        OutputFormat::Text => format!(
            "classes: {}\nfields: {}\nmethods: {}\nmethods with locals: {}",
            summary.classes, summary.fields, summary.methods, summary.methods_with_locals
        ),
    })
}

pub fn format_classes(tables: &RenameTables, format: OutputFormat) -> Result<String> {
    let mut renames: Vec<ClassRename<'_>> = tables
        .classes
        .iter()
        .map(|(from, to)| ClassRename { from, to })
        .collect();
    renames.sort_by_key(|r| r.from);

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&renames)?,
        OutputFormat::Text => renames
            .iter()
            .map(|r| format!("{} -> {}", r.from, r.to))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}
