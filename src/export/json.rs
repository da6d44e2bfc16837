//! JSON export implementation.
//!
//! Writes the chart records as a pretty-printed JSON array, the exact
//! shape a treemap renderer consumes.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData<'_>, writer: &mut W) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&data.analysis.assets)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{viewer_data, Analysis};
    use crate::bundle::StatsDocument;
    use crate::config::AnalyzerOptions;

    fn create_test_analysis() -> Analysis {
        let stats = StatsDocument::parse(
            r#"{
                "assets": [
                    { "name": "main.js", "size": 10, "chunks": [0] },
                    { "name": "lazy.js", "size": 10, "chunks": [1] }
                ],
                "chunks": [
                    { "id": 0, "entry": true, "initial": true },
                    { "id": 1, "parents": [0] }
                ],
                "modules": [
                    { "id": 1, "name": "./src/index.js", "size": 300, "chunks": [0] },
                    { "id": 2, "name": "./src/lazy/page.js", "size": 120, "chunks": [1] }
                ]
            }"#,
        )
        .unwrap();
        viewer_data(&stats, AnalyzerOptions::default()).unwrap()
    }

    fn export_value(analysis: &Analysis) -> serde_json::Value {
        let data = ExportData::new("stats.json", analysis);
        let mut output = Vec::new();
        JsonExporter.export(&data, &mut output).unwrap();

        let json_str = String::from_utf8(output).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn test_json_export_assets() {
        let parsed = export_value(&create_test_analysis());

        let assets = parsed.as_array().unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0]["label"], "main.js");
        assert_eq!(assets[0]["isAsset"], true);
        assert_eq!(assets[0]["statSize"], 300);
        assert_eq!(assets[0]["chunkMetadata"]["entry"], true);
        assert_eq!(assets[1]["parentAssetNames"][0], "main.js");
    }

    #[test]
    fn test_json_export_groups() {
        let parsed = export_value(&create_test_analysis());

        let lazy = &parsed[1];
        assert_eq!(lazy["groups"][0]["label"], "src/lazy");
        assert_eq!(lazy["groups"][0]["groups"][0]["path"], "src/lazy/page.js");
        assert!(lazy.get("parsedSize").is_none());
    }

    #[test]
    fn test_json_export_empty() {
        let parsed = export_value(&Analysis::default());
        assert_eq!(parsed, serde_json::json!([]));
    }
}
