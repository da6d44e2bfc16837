//! Chart-ready output records.
//!
//! These records are the only thing handed to the treemap renderer. They
//! serialize to camelCase JSON; sizes that were not measured are left out
//! rather than written as zero.

use serde::Serialize;
use std::ops::ControlFlow;

use crate::bundle::association::ChunkMetadata;
use crate::tree::Folder;

/// A folder or file record in an asset's breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartNode {
    Folder(ChartFolder),
    File(ChartFile),
}

impl ChartNode {
    pub fn label(&self) -> &str {
        match self {
            ChartNode::Folder(folder) => &folder.label,
            ChartNode::File(file) => &file.label,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            ChartNode::Folder(folder) => folder.size,
            ChartNode::File(file) => file.size,
        }
    }

    pub fn parsed_size(&self) -> Option<u64> {
        match self {
            ChartNode::Folder(folder) => folder.parsed_size,
            ChartNode::File(file) => file.parsed_size,
        }
    }

    /// Child records; empty for files.
    pub fn groups(&self) -> &[ChartNode] {
        match self {
            ChartNode::Folder(folder) => &folder.groups,
            ChartNode::File(_) => &[],
        }
    }
}

/// Folder record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFolder {
    pub label: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_size: Option<u64>,
    /// Set for a concatenated module; omitted for plain directories
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub concatenated: bool,
    pub groups: Vec<ChartNode>,
}

/// File record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFile {
    pub label: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_size: Option<u64>,
    pub path: String,
}

/// Top-level record for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAsset {
    /// Asset file name
    pub label: String,

    /// Always true; lets the renderer tell assets from modules
    pub is_asset: bool,

    /// Sum of module sizes from the stats file, or the asset's declared size
    /// when no modules were matched
    pub stat_size: u64,

    /// Size of the emitted bundle file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_size: Option<u64>,

    /// Gzip-compressed size of the emitted bundle file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_size: Option<u64>,

    /// Breakdown of the asset's module tree
    pub groups: Vec<ChartNode>,

    /// Entry/initial flags, null when the asset has no single chunk
    pub chunk_metadata: Option<ChunkMetadata>,

    /// Names of assets built from this asset's parent chunks
    pub parent_asset_names: Vec<String>,

    /// Names of other assets sharing a parent chunk with this asset
    pub sibling_asset_names: Vec<String>,
}

impl ChartAsset {
    /// Returns true if the emitted bundle was parsed for this asset.
    pub fn is_parsed(&self) -> bool {
        self.parsed_size.is_some()
    }
}

/// Everything the pipeline derived for one asset.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    pub name: String,
    pub size: u64,
    pub parsed_size: Option<u64>,
    pub gzip_size: Option<u64>,
    /// Module tree built from the asset's modules
    pub tree: Folder,
    pub parent_asset_names: Vec<String>,
    pub sibling_asset_names: Vec<String>,
    pub chunk_metadata: Option<ChunkMetadata>,
}

impl AssetRecord {
    /// Convert into the renderer's record.
    ///
    /// The stats size of the tree is preferred over the asset's declared
    /// size: with a minifier in the build, module sizes are pre-minification
    /// while the declared asset size is post-minification. The declared size
    /// is used only when the tree is empty.
    pub fn to_chart_asset(&self) -> ChartAsset {
        let tree_size = self.tree.size();
        ChartAsset {
            label: self.name.clone(),
            is_asset: true,
            stat_size: if tree_size == 0 { self.size } else { tree_size },
            parsed_size: self.parsed_size,
            gzip_size: self.gzip_size,
            groups: self.tree.to_chart_data().groups,
            chunk_metadata: self.chunk_metadata,
            parent_asset_names: self.parent_asset_names.clone(),
            sibling_asset_names: self.sibling_asset_names.clone(),
        }
    }
}

/// Assemble chart records, one per asset, in the given order.
pub fn assemble(records: &[AssetRecord]) -> Vec<ChartAsset> {
    records.iter().map(AssetRecord::to_chart_asset).collect()
}

/// Visit chart nodes depth first, parents before children.
///
/// Stops as soon as the visitor breaks and returns that break.
pub fn walk_nodes<F>(nodes: &[ChartNode], visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&ChartNode) -> ControlFlow<()>,
{
    for node in nodes {
        visit(node)?;
        walk_nodes(node.groups(), visit)?;
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_tree, ModuleUnit};
    use serde_json::json;

    fn leaf(path: &str, size: u64) -> ModuleUnit {
        ModuleUnit::Leaf {
            segments: crate::tree::path::split_module_path(path),
            size,
            parsed_src: None,
        }
    }

    fn record(name: &str, size: u64, units: &[ModuleUnit]) -> AssetRecord {
        AssetRecord {
            name: name.to_string(),
            size,
            parsed_size: None,
            gzip_size: None,
            tree: build_tree(units),
            parent_asset_names: Vec::new(),
            sibling_asset_names: Vec::new(),
            chunk_metadata: None,
        }
    }

    #[test]
    fn test_stat_size_prefers_tree() {
        let asset = record("a.js", 5, &[leaf("./src/a.js", 100)]).to_chart_asset();
        assert_eq!(asset.stat_size, 100);
    }

    #[test]
    fn test_stat_size_falls_back_to_declared_size() {
        let asset = record("empty.js", 42, &[]).to_chart_asset();
        assert_eq!(asset.stat_size, 42);
        assert!(asset.groups.is_empty());
    }

    #[test]
    fn test_groups_are_tree_children() {
        let asset = record("a.js", 0, &[leaf("./src/a.js", 1), leaf("./lib/b.js", 2)])
            .to_chart_asset();

        let labels: Vec<_> = asset.groups.iter().map(ChartNode::label).collect();
        assert_eq!(labels, vec!["lib", "src"]);
    }

    #[test]
    fn test_assemble_keeps_order() {
        let records = vec![record("z.js", 1, &[]), record("a.js", 2, &[])];
        let labels: Vec<_> = assemble(&records).into_iter().map(|a| a.label).collect();
        assert_eq!(labels, vec!["z.js", "a.js"]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut rec = record("main.js", 0, &[leaf("./src/a.js", 100)]);
        rec.chunk_metadata = Some(ChunkMetadata {
            entry: true,
            initial: true,
        });
        rec.parent_asset_names = vec!["runtime.js".to_string()];
        rec.sibling_asset_names = vec!["vendor.js".to_string()];

        let value = serde_json::to_value(rec.to_chart_asset()).unwrap();
        assert_eq!(
            value,
            json!({
                "label": "main.js",
                "isAsset": true,
                "statSize": 100,
                "groups": [{
                    "label": "src",
                    "size": 100,
                    "groups": [{ "label": "a.js", "size": 100, "path": "src/a.js" }]
                }],
                "chunkMetadata": { "entry": true, "initial": true },
                "parentAssetNames": ["runtime.js"],
                "siblingAssetNames": ["vendor.js"]
            })
        );
    }

    #[test]
    fn test_serialized_null_metadata_and_sizes() {
        let mut rec = record("main.js", 10, &[]);
        rec.parsed_size = Some(8);
        rec.gzip_size = Some(4);

        let value = serde_json::to_value(rec.to_chart_asset()).unwrap();
        assert_eq!(value["chunkMetadata"], serde_json::Value::Null);
        assert_eq!(value["parsedSize"], 8);
        assert_eq!(value["gzipSize"], 4);
    }

    #[test]
    fn test_is_parsed() {
        let mut rec = record("a.js", 1, &[]);
        assert!(!rec.to_chart_asset().is_parsed());
        rec.parsed_size = Some(1);
        assert!(rec.to_chart_asset().is_parsed());
    }

    #[test]
    fn test_walk_nodes_visits_all() {
        let asset = record(
            "a.js",
            0,
            &[leaf("./src/a.js", 1), leaf("./src/b.js", 2), leaf("./c.js", 3)],
        )
        .to_chart_asset();

        let mut labels = Vec::new();
        let flow = walk_nodes(&asset.groups, &mut |node| {
            labels.push(node.label().to_string());
            ControlFlow::Continue(())
        });

        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(labels, vec!["c.js", "src", "a.js", "b.js"]);
    }

    #[test]
    fn test_walk_nodes_stops_early() {
        let asset = record("a.js", 0, &[leaf("./src/a.js", 1), leaf("./src/b.js", 2)])
            .to_chart_asset();

        let mut visited = 0;
        let flow = walk_nodes(&asset.groups, &mut |node| {
            visited += 1;
            if node.label() == "a.js" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(visited, 2);
    }
}
