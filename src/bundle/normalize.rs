//! Stats normalization.
//!
//! Turns a raw [`StatsDocument`] into the clean inputs the rest of the
//! pipeline works on: script assets with query suffixes removed, and a
//! module list with duplicates dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::stats::{Id, StatsAsset, StatsChunk, StatsDocument, StatsModule};
use crate::config::ExcludeAssets;

/// Query suffix webpack allows on output filenames (`main.js?v=3`).
static FILENAME_QUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?.*$").unwrap());

/// Script assets the analyzer knows how to break down.
static FILENAME_EXTENSIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(js|mjs)$").unwrap());

/// The normalized view of a stats document.
#[derive(Debug, Clone, Default)]
pub struct NormalizedStats<'a> {
    /// Kept assets, names cleaned, in document order
    pub assets: Vec<StatsAsset>,

    /// Deduplicated modules, first occurrence wins
    pub modules: Vec<&'a StatsModule>,

    /// Chunks of the effective document
    pub chunks: &'a [StatsChunk],
}

/// Remove a trailing `?query` from an asset name.
///
/// # Example
///
/// ```
/// use bundlescope::bundle::normalize::clean_asset_name;
///
/// assert_eq!(clean_asset_name("main.js?v=1"), "main.js");
/// assert_eq!(clean_asset_name("main.js"), "main.js");
/// ```
pub fn clean_asset_name(name: &str) -> String {
    FILENAME_QUERY.replace(name, "").into_owned()
}

/// Returns true if the (cleaned) asset name is a `.js` or `.mjs` file.
pub fn is_script_asset(name: &str) -> bool {
    FILENAME_EXTENSIONS.is_match(name)
}

/// Clean every asset name, then keep script assets that were built from at
/// least one chunk and that the exclusion rules let through.
///
/// Cleaning happens before filtering so both the extension test and the
/// exclusion rules see the cleaned name.
pub fn normalize_assets(assets: &[StatsAsset], exclude: &ExcludeAssets) -> Vec<StatsAsset> {
    assets
        .iter()
        .map(|asset| StatsAsset {
            name: clean_asset_name(&asset.name),
            ..asset.clone()
        })
        .filter(|asset| {
            is_script_asset(&asset.name)
                && !asset.chunks.is_empty()
                && exclude.is_included(&asset.name)
        })
        .collect()
}

#[derive(PartialEq, Eq, Hash)]
enum ModuleKey<'a> {
    Id(&'a Id),
    Path(&'a str),
}

/// Gather modules from every chunk, then from the top-level module list,
/// keeping the first occurrence of each module ID.
///
/// Modules without an ID are deduplicated by path instead. Sub-modules of
/// concatenated modules are left in place for the tree builder.
pub fn collect_modules(stats: &StatsDocument) -> Vec<&StatsModule> {
    let chunk_modules = stats
        .chunks
        .iter()
        .filter_map(|chunk| chunk.modules.as_deref());
    let top_level = stats.modules.as_deref();

    let mut seen = HashSet::new();
    chunk_modules
        .chain(top_level)
        .flatten()
        .filter(|module| {
            let key = match (&module.id, module.module_path()) {
                (Some(id), _) => ModuleKey::Id(id),
                (None, Some(path)) => ModuleKey::Path(path),
                (None, None) => return true,
            };
            seen.insert(key)
        })
        .collect()
}

/// Normalize a stats document.
///
/// Uses the first child compilation when the document itself has no
/// assets.
pub fn normalize<'a>(stats: &'a StatsDocument, exclude: &ExcludeAssets) -> NormalizedStats<'a> {
    let stats = stats.effective();

    NormalizedStats {
        assets: normalize_assets(&stats.assets, exclude),
        modules: collect_modules(stats),
        chunks: &stats.chunks,
    }
}
