//! BundleScope - webpack stats analyzer with treemap-ready size breakdowns
//!
//! This crate reads a webpack stats report, associates modules with the
//! assets that contain them, and builds one compacted directory tree per
//! asset with stat, parsed and gzip sizes for visualization.

pub mod analyzer;
pub mod bundle;
pub mod chart;
pub mod config;
pub mod export;
pub mod tree;
pub mod warnings;

pub use analyzer::{viewer_data, AnalyzeError, Analysis, Analyzer};
pub use chart::{ChartAsset, ChartNode};
pub use config::{AnalyzerOptions, AssetFilter, ExcludeAssets};
pub use warnings::Warnings;
