//! The analysis pipeline.
//!
//! Runs the stages in order over one stats document:
//!
//! 1. normalize assets and modules
//! 2. optionally parse emitted bundles for real sizes
//! 3. associate modules, parent assets and chunk metadata with each asset
//! 4. build one compacted module tree per asset
//! 5. assemble chart records
//!
//! # Example
//!
//! ```ignore
//! use bundlescope::{Analyzer, AnalyzerOptions};
//!
//! let analyzer = Analyzer::new(AnalyzerOptions::new().bundle_dir("dist"));
//! let analysis = analyzer.analyze_file("dist/stats.json")?;
//!
//! for asset in &analysis.assets {
//!     println!("{}: {} bytes", asset.label, asset.stat_size);
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::bundle::association::{
    chunk_metadata, modules_for_asset, parent_assets, sibling_assets, ChunkError, ChunkIndex,
};
use crate::bundle::normalize::{normalize, NormalizedStats};
use crate::bundle::source::{
    parse_bundles, BundleParser, CompressionSizer, GzipSizer, ParsedBundles, RawBundleReader,
};
use crate::bundle::stats::{StatsDocument, StatsError};
use crate::chart::{assemble, AssetRecord, ChartAsset};
use crate::config::AnalyzerOptions;
use crate::tree::{build_tree_with_conflicts, ModuleUnit};
use crate::warnings::Warnings;

/// Errors that abort an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The stats document could not be loaded.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// An asset references an unknown chunk and strict chunk checking is on.
    #[error(transparent)]
    Chunk(#[from] ChunkError),
}

/// Result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Chart records, one per kept asset, in stats order
    pub assets: Vec<ChartAsset>,

    /// Warnings emitted during the run
    pub warnings: Vec<String>,
}

/// Runs the pipeline with a given set of options and collaborators.
#[derive(Clone)]
pub struct Analyzer {
    options: AnalyzerOptions,
    parser: Arc<dyn BundleParser>,
    sizer: Arc<dyn CompressionSizer>,
}

impl Analyzer {
    /// Create an analyzer that reads bundles as plain text and measures gzip size.
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            parser: Arc::new(RawBundleReader),
            sizer: Arc::new(GzipSizer::default()),
        }
    }

    /// Use a different bundle parser.
    pub fn with_parser(mut self, parser: impl BundleParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Use a different compression sizer.
    pub fn with_sizer(mut self, sizer: impl CompressionSizer + 'static) -> Self {
        self.sizer = Arc::new(sizer);
        self
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Load a stats file and analyze it.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<Analysis, AnalyzeError> {
        let stats = StatsDocument::from_file(path)?;
        self.analyze(&stats)
    }

    /// Analyze a stats document.
    ///
    /// Only strict chunk checking can make this fail; every other problem
    /// with an individual asset becomes a warning.
    pub fn analyze(&self, stats: &StatsDocument) -> Result<Analysis, AnalyzeError> {
        let mut warnings = Warnings::default();
        let normalized = normalize(stats, &self.options.exclude_assets);
        debug!(
            "Normalized stats: {} assets, {} modules",
            normalized.assets.len(),
            normalized.modules.len()
        );

        let parsed = self.options.bundle_dir.as_deref().and_then(|dir| {
            let names: Vec<String> = normalized.assets.iter().map(|a| a.name.clone()).collect();
            parse_bundles(
                dir,
                &names,
                Arc::clone(&self.parser),
                self.options.parse_timeout,
                &mut warnings,
            )
        });

        let chunks = ChunkIndex::new(normalized.chunks);
        debug!("Indexed {} chunks", chunks.len());

        // Assets sharing a cleaned name collapse into one record: the later
        // asset's data at the earlier asset's position.
        let mut records: Vec<AssetRecord> = Vec::with_capacity(normalized.assets.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for index in 0..normalized.assets.len() {
            let record =
                self.asset_record(index, &normalized, &chunks, parsed.as_ref(), &mut warnings)?;
            match positions.get(&record.name) {
                Some(&pos) => records[pos] = record,
                None => {
                    positions.insert(record.name.clone(), records.len());
                    records.push(record);
                }
            }
        }

        Ok(Analysis {
            assets: assemble(&records),
            warnings: warnings.into_messages(),
        })
    }

    fn asset_record(
        &self,
        index: usize,
        normalized: &NormalizedStats<'_>,
        chunks: &ChunkIndex<'_>,
        parsed: Option<&ParsedBundles>,
        warnings: &mut Warnings,
    ) -> Result<AssetRecord, AnalyzeError> {
        let asset = &normalized.assets[index];

        let (parsed_size, gzip_size) = match parsed.and_then(|p| p.source(&asset.name)) {
            Some(src) => {
                let gzip_size = match self.sizer.compressed_size(src) {
                    Ok(size) => Some(size),
                    Err(e) => {
                        warnings.push(format!(
                            "Could not compute gzip size of \"{}\": {}",
                            asset.name, e
                        ));
                        None
                    }
                };
                (Some(src.len() as u64), gzip_size)
            }
            None => (None, None),
        };

        let modules = modules_for_asset(asset, &normalized.modules);
        let module_sources = parsed.map(|p| &p.modules);
        let units: Vec<ModuleUnit> = modules
            .iter()
            .filter_map(|module| ModuleUnit::from_stats(module, module_sources))
            .collect();
        let (tree, conflicts) = build_tree_with_conflicts(&units);
        for conflict in conflicts {
            warnings.push(format!("Asset \"{}\": {}", asset.name, conflict));
        }
        debug!(
            "Asset {}: {} modules, stat size {}",
            asset.name,
            modules.len(),
            tree.size()
        );

        let parent_asset_names = parent_assets(index, &normalized.assets, chunks)
            .into_iter()
            .map(|parent| parent.name.clone())
            .collect();
        let sibling_asset_names = sibling_assets(index, &normalized.assets, chunks)
            .into_iter()
            .map(|sibling| sibling.name.clone())
            .collect();

        let chunk_metadata = match chunk_metadata(asset, chunks) {
            Ok(metadata) => metadata,
            Err(e) if self.options.strict_chunks => return Err(e.into()),
            Err(e) => {
                warnings.push(e.to_string());
                None
            }
        };

        Ok(AssetRecord {
            name: asset.name.clone(),
            size: asset.size,
            parsed_size,
            gzip_size,
            tree,
            parent_asset_names,
            sibling_asset_names,
            chunk_metadata,
        })
    }
}

/// Analyze a stats document with the default collaborators.
pub fn viewer_data(
    stats: &StatsDocument,
    options: AnalyzerOptions,
) -> Result<Analysis, AnalyzeError> {
    Analyzer::new(options).analyze(stats)
}
