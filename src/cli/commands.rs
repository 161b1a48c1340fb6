use crate::backend::Backend;
use crate::config::RegistryConfig;
use crate::core::dates::{is_valid_date, normalize_date_str};
use crate::core::fields::{BASE_COLUMNS, DETAIL_COLUMNS};
use crate::core::form::{prepare_form, validate_form};
use crate::core::records::{filter_records, SearchCriteria};
use crate::error::{RegistryError, RegistryResult};
use crate::excel::{template, ExportFormat, ExportRequest, ImportSession};
use crate::types::{ImportBatch, WorkerRecord};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Rows shown in an import preview before the listing is cut short.
const PREVIEW_ROWS: usize = 10;
/// Widest a cell may be in a terminal listing.
const LIST_CELL_WIDTH: usize = 22;

/// Options for the export command
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub output: Option<PathBuf>,
    pub columns: Option<Vec<String>>,
    pub title: Option<String>,
    pub format: Option<ExportFormat>,
    pub detail: bool,
    pub input: Option<PathBuf>,
    pub field: Option<String>,
    pub query: Option<String>,
}

/// Which list a record-level command works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Base,
    Detail,
}

impl ListKind {
    pub fn from_flag(detail: bool) -> Self {
        if detail {
            ListKind::Detail
        } else {
            ListKind::Base
        }
    }

    fn table(&self, records: &[&WorkerRecord]) -> Vec<String> {
        table_lines(records, self.columns())
    }

    fn columns(&self) -> &'static [&'static str] {
        match self {
            ListKind::Base => BASE_COLUMNS,
            ListKind::Detail => DETAIL_COLUMNS,
        }
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

fn table_lines(records: &[&WorkerRecord], columns: &[&str]) -> Vec<String> {
    let row = |cells: Vec<String>| {
        cells
            .iter()
            .map(|c| format!("{:<w$}", clip(c, LIST_CELL_WIDTH), w = LIST_CELL_WIDTH))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut lines = vec![row(columns.iter().map(|c| c.to_string()).collect())];
    lines.extend(
        records
            .iter()
            .map(|record| row(columns.iter().map(|c| record.text(c)).collect())),
    );
    lines
}

fn print_table(records: &[&WorkerRecord], columns: &[&str]) {
    print_lines(&table_lines(records, columns));
}

fn print_lines(lines: &[String]) {
    let mut iter = lines.iter();
    if let Some(header) = iter.next() {
        println!("   {}", header.bold());
        println!("   {}", "─".repeat(header.chars().count() + 1));
    }
    for line in iter {
        println!("   {}", line);
    }
}

fn print_batch(batch: &ImportBatch) {
    println!("   Columns: {}", batch.headers.join(", ").cyan());
    println!("   Rows:    {}\n", batch.rows.len().to_string().bold());

    let preview: Vec<&WorkerRecord> = batch.rows.iter().take(PREVIEW_ROWS).collect();
    print_table(&preview, &["NAMA", "NIK", "TTL", "RT_RW"]);
    if batch.rows.len() > PREVIEW_ROWS {
        println!(
            "   {}",
            format!("... and {} more rows", batch.rows.len() - PREVIEW_ROWS).dimmed()
        );
    }
    println!();
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> RegistryResult<T> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Records to work on: a JSON file when given, otherwise the backend list.
async fn load_records(
    input: Option<&Path>,
    kind: ListKind,
    backend: &dyn Backend,
) -> RegistryResult<Vec<WorkerRecord>> {
    match input {
        Some(path) => read_json(path).await,
        None => Ok(match kind {
            ListKind::Base => backend.fetch_all().await?,
            ListKind::Detail => backend.fetch_detail_all().await?,
        }),
    }
}

/// Execute the import command: preview the sheet and optionally submit it
pub async fn import(file: PathBuf, submit: bool, backend: &dyn Backend) -> RegistryResult<()> {
    println!("{}", "📥 Registry - Spreadsheet Import".bold().green());
    println!("   File: {}\n", file.display());

    let mut session = ImportSession::new();
    let batch = session.load_file(&file).await?;
    print_batch(batch);

    if !batch.errors.is_empty() {
        println!(
            "{}",
            format!("❌ {} invalid date(s) found:", batch.errors.len())
                .bold()
                .red()
        );
        for error in &batch.errors {
            println!("   • {}", error.message.red());
        }
        println!();
    } else {
        println!("{}", "✅ All dates valid".bold().green());
    }

    if !submit {
        if batch.is_submittable() {
            println!("   Run again with {} to import.\n", "--submit".bold());
        }
        return Ok(());
    }

    let rows = batch.rows.len();
    let reply = session.submit(backend).await?;
    println!(
        "{}",
        format!("✅ {}", reply.message_or("Data imported")).bold().green()
    );
    println!("   Rows sent: {}\n", rows);
    Ok(())
}

/// Execute the template command
pub fn template(output: PathBuf) -> RegistryResult<()> {
    println!("{}", "📄 Registry - Import Template".bold().green());
    template::write_template(&output)?;
    println!("{}", "✅ Template written".bold().green());
    println!("   File: {}\n", output.display());
    println!("   Dates must be day-first: {}", "dd/mm/yyyy".bold());
    Ok(())
}

/// Execute the export command
pub async fn export(
    options: ExportOptions,
    config: &RegistryConfig,
    backend: &dyn Backend,
) -> RegistryResult<()> {
    println!("{}", "📤 Registry - Export".bold().green());

    let kind = ListKind::from_flag(options.detail);
    let records = load_records(options.input.as_deref(), kind, backend).await?;
    let records: Vec<WorkerRecord> = match &options.field {
        Some(field) => filter_records(&records, field, options.query.as_deref().unwrap_or(""))
            .into_iter()
            .cloned()
            .collect(),
        None => records,
    };

    let format = options
        .format
        .or_else(|| options.output.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or_default();
    let columns = options
        .columns
        .unwrap_or_else(|| kind.columns().iter().map(|c| c.to_string()).collect());
    let title = options
        .title
        .unwrap_or_else(|| config.export.report_title.clone());

    let request = ExportRequest::new(title)
        .with_columns(columns)
        .with_format(format)
        .with_sheet_name(config.export.sheet_name.clone());
    let output = options
        .output
        .unwrap_or_else(|| PathBuf::from(request.file_name()));

    request.write(&records, &output)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Records: {}", records.len());
    println!("   Columns: {}", request.columns.join(", ").cyan());
    println!("   File:    {}\n", output.display());
    Ok(())
}

/// Execute the list command
pub async fn list(
    detail: bool,
    field: Option<String>,
    query: Option<String>,
    backend: &dyn Backend,
) -> RegistryResult<()> {
    let kind = ListKind::from_flag(detail);
    let records = load_records(None, kind, backend).await?;
    let shown = match &field {
        Some(f) => filter_records(&records, f, query.as_deref().unwrap_or("")),
        None => records.iter().collect(),
    };

    println!(
        "{}",
        format!("👥 Workers ({} of {})", shown.len(), records.len())
            .bold()
            .green()
    );
    print_lines(&kind.table(&shown));
    Ok(())
}

/// Execute the search command with `KEY=VALUE` criteria
pub async fn search(pairs: Vec<String>, backend: &dyn Backend) -> RegistryResult<()> {
    let criteria = SearchCriteria::from_pairs(&pairs).map_err(RegistryError::Validation)?;
    if criteria.is_blank() {
        println!("{}", "⚠️  Empty search, nothing sent".yellow());
        return Ok(());
    }

    let results = backend.search(&criteria).await?;
    println!(
        "{}",
        format!("🔎 {} match(es)", results.len()).bold().green()
    );
    let shown: Vec<&WorkerRecord> = results.iter().collect();
    print_table(&shown, BASE_COLUMNS);
    Ok(())
}

/// Read a record file and apply the form rules, printing every issue.
async fn read_form(file: &Path) -> RegistryResult<WorkerRecord> {
    let record: WorkerRecord = read_json(file).await?;
    let prepared = prepare_form(&record);
    let issues = validate_form(&prepared);
    if issues.is_empty() {
        return Ok(prepared);
    }

    println!("{}", "❌ Form has errors:".bold().red());
    for issue in &issues {
        println!("   • {}", issue.to_string().red());
    }
    Err(RegistryError::Validation(format!(
        "{} field(s) need fixing",
        issues.len()
    )))
}

/// Execute the add command
pub async fn add(file: PathBuf, detail: bool, backend: &dyn Backend) -> RegistryResult<()> {
    let record = read_form(&file).await?;
    let reply = match ListKind::from_flag(detail) {
        ListKind::Base => backend.create(&record).await?,
        ListKind::Detail => backend.create_detail(&record).await?,
    };
    println!(
        "{}",
        format!("✅ {}", reply.message_or("Data saved")).bold().green()
    );
    Ok(())
}

/// Execute the edit command; the record must carry its backend `id`
pub async fn edit(file: PathBuf, detail: bool, backend: &dyn Backend) -> RegistryResult<()> {
    let record = read_form(&file).await?;
    if record.id().is_none() {
        return Err(RegistryError::Validation(
            "Record has no id, cannot update".to_string(),
        ));
    }
    let reply = match ListKind::from_flag(detail) {
        ListKind::Base => backend.update(&record).await?,
        ListKind::Detail => backend.update_detail(&record).await?,
    };
    println!(
        "{}",
        format!("✅ {}", reply.message_or("Data updated")).bold().green()
    );
    Ok(())
}

/// Execute the delete command
pub async fn delete(id: String, backend: &dyn Backend) -> RegistryResult<()> {
    if id.trim().is_empty() {
        return Err(RegistryError::Validation("Missing record id".to_string()));
    }
    let reply = backend.delete(id.trim()).await?;
    println!(
        "{}",
        format!("✅ {}", reply.message_or("Data deleted")).bold().green()
    );
    Ok(())
}

/// Execute the check-date command: normalize each value and report validity
pub fn check_date(values: Vec<String>) -> RegistryResult<()> {
    let mut invalid = 0;
    for value in &values {
        let normalized = normalize_date_str(value);
        if is_valid_date(&normalized) {
            println!("   {} {} → {}", "✅".green(), value, normalized.bold());
        } else {
            invalid += 1;
            println!("   {} {} → {}", "❌".red(), value, normalized.red());
        }
    }

    if invalid > 0 {
        return Err(RegistryError::Validation(format!(
            "{} of {} date(s) invalid, use dd/mm/yyyy",
            invalid,
            values.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
