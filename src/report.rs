/// Table rendering for file records
///
/// Columns follow the active [`FilterConfig`] fields, so a report never shows
/// a column the extraction did not fill.
use crate::filter::FilterConfig;
use crate::metadata::FileRecord;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use std::collections::BTreeMap;

/// Format a file size in human-readable form
///
/// Examples:
/// - 512 -> "512 B"
/// - 2048 -> "2.00 KB"
/// - 1572864 -> "1.50 MB"
pub fn human_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: &[char] = &['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.2} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}

fn format_meta(meta: &BTreeMap<String, String>) -> String {
    meta.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn header(config: &FilterConfig) -> Vec<&'static str> {
    let mut header = vec!["#", "Name"];
    if config.compute_size {
        header.push("Size");
    }
    if config.compute_hash {
        header.push("MD5");
    }
    if config.compute_meta {
        header.push("Meta");
    }
    header
}

pub fn row(index: usize, record: &FileRecord, config: &FilterConfig) -> Vec<String> {
    let mut row = vec![(index + 1).to_string(), record.name.clone()];
    if config.compute_size {
        row.push(human_size(record.size));
    }
    if config.compute_hash {
        row.push(record.md5.clone().unwrap_or_default());
    }
    if config.compute_meta {
        row.push(record.meta.as_ref().map(format_meta).unwrap_or_default());
    }
    row
}

pub fn render_table(records: &[FileRecord], config: &FilterConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(config));

    for (index, record) in records.iter().enumerate() {
        table.add_row(row(index, record, config));
    }
    table
}

pub fn print_records(title: &str, records: &[FileRecord], config: &FilterConfig) {
    crate::info!("{}", title);
    crate::info!("{}", render_table(records, config));
}
