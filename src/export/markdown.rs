//! Markdown export implementation.
//!
//! Writes a per-asset size report for documentation and code review.

use super::{format_size, ExportData, Exporter};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

fn optional_size(size: Option<u64>) -> String {
    size.map(format_size).unwrap_or_else(|| "-".to_string())
}

fn name_list(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData<'_>, writer: &mut W) -> io::Result<()> {
        let analysis = data.analysis;

        // Title
        writeln!(writer, "# Bundle Size Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Stats:** {}", data.source)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Assets | {} |", analysis.assets.len())?;
        writeln!(
            writer,
            "| Total Stat Size | {} |",
            format_size(data.total_stat_size())
        )?;
        if let Some(size) = data.total_parsed_size() {
            writeln!(writer, "| Total Parsed Size | {} |", format_size(size))?;
        }
        if let Some(size) = data.total_gzip_size() {
            writeln!(writer, "| Total Gzip Size | {} |", format_size(size))?;
        }
        writeln!(writer)?;

        if !analysis.assets.is_empty() {
            writeln!(writer, "## Assets")?;
            writeln!(writer)?;
            writeln!(
                writer,
                "| Asset | Stat | Parsed | Gzip | Flags | Parents | Siblings |"
            )?;
            writeln!(
                writer,
                "|-------|------|--------|------|-------|---------|----------|"
            )?;
            for asset in &analysis.assets {
                let flags = match asset.chunk_metadata {
                    Some(meta) => {
                        let mut flags = Vec::new();
                        if meta.entry {
                            flags.push("entry");
                        }
                        if meta.initial {
                            flags.push("initial");
                        }
                        flags.join(", ")
                    }
                    None => "-".to_string(),
                };
                writeln!(
                    writer,
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    asset.label,
                    format_size(asset.stat_size),
                    optional_size(asset.parsed_size),
                    optional_size(asset.gzip_size),
                    flags,
                    name_list(&asset.parent_asset_names),
                    name_list(&asset.sibling_asset_names)
                )?;
            }
            writeln!(writer)?;
        }

        if !analysis.warnings.is_empty() {
            writeln!(writer, "## Warnings")?;
            writeln!(writer)?;
            for warning in &analysis.warnings {
                writeln!(writer, "- {}", warning.trim())?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}
