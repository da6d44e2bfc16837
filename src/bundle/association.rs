//! Module-to-asset association.
//!
//! Assets, chunks and modules reference each other only by chunk ID. The
//! [`ChunkIndex`] resolves those references once per run; the functions
//! here answer which modules an asset contains, which assets it depends
//! on or shares a parent with, and how its chunk is classified.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::stats::{Id, StatsAsset, StatsChunk, StatsModule};

/// Errors raised while resolving chunk references.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    /// An asset names a chunk ID that the stats document does not define.
    #[error("Asset '{asset}' references unknown chunk '{chunk}'")]
    Unresolved { asset: String, chunk: Id },
}

/// Entry/initial classification of an asset's single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
    /// The chunk is an application entry point
    pub entry: bool,
    /// The chunk is loaded on initial page load
    pub initial: bool,
}

/// Chunk ID lookup table, built once per stats document.
#[derive(Debug, Default)]
pub struct ChunkIndex<'a> {
    by_id: HashMap<&'a Id, &'a StatsChunk>,
}

impl<'a> ChunkIndex<'a> {
    /// Index chunks by ID. When an ID repeats, the first chunk wins.
    pub fn new(chunks: &'a [StatsChunk]) -> Self {
        let mut by_id = HashMap::with_capacity(chunks.len());
        for chunk in chunks {
            if let Some(id) = &chunk.id {
                by_id.entry(id).or_insert(chunk);
            }
        }
        Self { by_id }
    }

    pub fn get(&self, id: &Id) -> Option<&'a StatsChunk> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Returns true if the module shares at least one chunk with the asset.
pub fn asset_has_module(asset: &StatsAsset, module: &StatsModule) -> bool {
    module.chunks.iter().any(|chunk| asset.chunks.contains(chunk))
}

/// Modules belonging to the asset, in module order.
pub fn modules_for_asset<'m>(
    asset: &StatsAsset,
    modules: &[&'m StatsModule],
) -> Vec<&'m StatsModule> {
    modules
        .iter()
        .copied()
        .filter(|module| asset_has_module(asset, module))
        .collect()
}

/// Parent chunk IDs of every chunk of the asset. Unresolvable chunk IDs
/// contribute nothing.
fn parent_chunk_ids<'c>(asset: &StatsAsset, chunks: &ChunkIndex<'c>) -> HashSet<&'c Id> {
    asset
        .chunks
        .iter()
        .filter_map(|id| chunks.get(id))
        .flat_map(|chunk| chunk.parents.iter())
        .collect()
}

/// Assets built from any parent chunk of the asset at `asset_index`.
///
/// Parent chunk IDs are unioned across all of the asset's chunks; chunk IDs
/// that cannot be resolved contribute no parents. The asset itself is never
/// its own parent. Results keep the order of `assets`.
pub fn parent_assets<'s>(
    asset_index: usize,
    assets: &'s [StatsAsset],
    chunks: &ChunkIndex<'_>,
) -> Vec<&'s StatsAsset> {
    let Some(asset) = assets.get(asset_index) else {
        return Vec::new();
    };

    let parent_chunks = parent_chunk_ids(asset, chunks);
    if parent_chunks.is_empty() {
        return Vec::new();
    }

    assets
        .iter()
        .enumerate()
        .filter(|&(i, other)| {
            i != asset_index && other.chunks.iter().any(|c| parent_chunks.contains(c))
        })
        .map(|(_, other)| other)
        .collect()
}

/// Other assets whose chunks share at least one parent chunk with the
/// asset at `asset_index`.
///
/// An asset without resolvable parent chunks has no siblings. Results keep
/// the order of `assets`.
pub fn sibling_assets<'s>(
    asset_index: usize,
    assets: &'s [StatsAsset],
    chunks: &ChunkIndex<'_>,
) -> Vec<&'s StatsAsset> {
    let Some(asset) = assets.get(asset_index) else {
        return Vec::new();
    };

    let parent_chunks = parent_chunk_ids(asset, chunks);
    if parent_chunks.is_empty() {
        return Vec::new();
    }

    assets
        .iter()
        .enumerate()
        .filter(|&(i, other)| {
            i != asset_index
                && parent_chunk_ids(other, chunks)
                    .iter()
                    .any(|id| parent_chunks.contains(id))
        })
        .map(|(_, other)| other)
        .collect()
}

/// Entry/initial flags for a single-chunk asset.
///
/// Assets with no chunks, or with more than one, cannot be described by a
/// single chunk's flags and yield `None`. A single chunk ID missing from
/// the index is an error for this asset.
pub fn chunk_metadata(
    asset: &StatsAsset,
    chunks: &ChunkIndex<'_>,
) -> Result<Option<ChunkMetadata>, ChunkError> {
    let [chunk_id] = asset.chunks.as_slice() else {
        return Ok(None);
    };

    let chunk = chunks.get(chunk_id).ok_or_else(|| ChunkError::Unresolved {
        asset: asset.name.clone(),
        chunk: chunk_id.clone(),
    })?;

    Ok(Some(ChunkMetadata {
        entry: chunk.entry,
        initial: chunk.initial,
    }))
}
