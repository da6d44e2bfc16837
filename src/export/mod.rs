//! Report writers for analysis results.
//!
//! This module provides exporters for writing an [`Analysis`] in
//! machine-readable JSON (the chart records, as handed to a treemap
//! renderer) or as a Markdown size report.

pub mod json;
pub mod markdown;

use crate::analyzer::Analysis;
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - chart records for a renderer
    Json,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Data container for export operations.
#[derive(Debug, Clone)]
pub struct ExportData<'a> {
    /// Where the stats came from (usually the stats file path)
    pub source: String,
    /// The analysis to write
    pub analysis: &'a Analysis,
}

impl<'a> ExportData<'a> {
    pub fn new(source: impl Into<String>, analysis: &'a Analysis) -> Self {
        Self {
            source: source.into(),
            analysis,
        }
    }

    /// Sum of all assets' stat sizes
    pub fn total_stat_size(&self) -> u64 {
        self.analysis.assets.iter().map(|a| a.stat_size).sum()
    }

    /// Sum of parsed sizes, if any asset was parsed
    pub fn total_parsed_size(&self) -> Option<u64> {
        sum_present(self.analysis.assets.iter().map(|a| a.parsed_size))
    }

    /// Sum of gzip sizes, if any asset was measured
    pub fn total_gzip_size(&self) -> Option<u64> {
        sum_present(self.analysis.assets.iter().map(|a| a.gzip_size))
    }
}

fn sum_present(sizes: impl Iterator<Item = Option<u64>>) -> Option<u64> {
    sizes.flatten().fold(None, |acc, size| Some(acc.unwrap_or(0) + size))
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData<'_>, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData<'_>,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData<'_>) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Format a byte size as a human-readable string.
///
/// # Example
///
/// ```
/// use bundlescope::export::format_size;
///
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
