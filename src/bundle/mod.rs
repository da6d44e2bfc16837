//! Webpack stats processing.
//!
//! This module turns a webpack `stats.json` into per-asset module lists:
//!
//! - [`stats`]: the stats document schema and loading
//! - [`normalize`]: asset filtering and module deduplication
//! - [`association`]: module membership, parent assets and chunk metadata
//! - [`source`]: reading emitted bundles for parsed and gzip sizes
//!
//! # Example
//!
//! ```ignore
//! use bundlescope::bundle::{chunk_metadata, normalize, ChunkIndex, StatsDocument};
//! use bundlescope::config::ExcludeAssets;
//!
//! let stats = StatsDocument::from_file("stats.json")?;
//! let normalized = normalize(&stats, &ExcludeAssets::none());
//! let chunks = ChunkIndex::new(normalized.chunks);
//!
//! for asset in &normalized.assets {
//!     println!("{}: {:?}", asset.name, chunk_metadata(asset, &chunks));
//! }
//! ```

pub mod association;
pub mod normalize;
pub mod source;
pub mod stats;

// Re-export main types for convenience
pub use association::{
    asset_has_module, chunk_metadata, modules_for_asset, parent_assets, sibling_assets,
    ChunkError, ChunkIndex, ChunkMetadata,
};
pub use normalize::{clean_asset_name, collect_modules, normalize, NormalizedStats};
pub use source::{
    BundleParser, BundleSource, CompressionSizer, GzipSizer, RawBundleReader, SourceError,
};
pub use stats::{Id, StatsAsset, StatsChunk, StatsDocument, StatsError, StatsModule};
