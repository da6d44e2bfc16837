//! Webpack stats document schema
//!
//! This module handles deserialization of the stats report written by
//! webpack (`webpack --json` or `stats.toJson()`), keeping only the parts
//! needed to associate modules with the assets that contain them.
//!
//! Every collection is optional in practice: older webpack versions and
//! custom stats presets drop fields freely, so all of them default to
//! empty rather than failing the parse.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Errors that can occur while loading a stats document.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Failed to read the file from disk.
    #[error("Failed to read stats file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse stats JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Represents a webpack stats.json document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsDocument {
    /// Generated output files
    #[serde(default)]
    pub assets: Vec<StatsAsset>,

    /// Chunks (code-split groups of modules)
    #[serde(default)]
    pub chunks: Vec<StatsChunk>,

    /// Top-level module list (absent with some stats presets)
    #[serde(default)]
    pub modules: Option<Vec<StatsModule>>,

    /// Child compilations. Multi-compiler builds put everything here and
    /// leave the top-level collections empty.
    #[serde(default)]
    pub children: Vec<StatsDocument>,
}

/// Represents a generated asset file from a webpack build.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsAsset {
    /// Asset file name, possibly with a `?query` suffix
    pub name: String,

    /// Emitted size in bytes
    #[serde(default)]
    pub size: u64,

    /// Chunk IDs this asset was built from
    #[serde(default)]
    pub chunks: Vec<Id>,
}

/// Represents a webpack chunk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsChunk {
    /// Chunk ID (can be number or string)
    pub id: Option<Id>,

    /// Chunk names
    #[serde(default)]
    pub names: Vec<String>,

    /// Whether this is an entry chunk
    #[serde(default)]
    pub entry: bool,

    /// Whether this chunk is loaded on initial page load
    #[serde(default)]
    pub initial: bool,

    /// Modules included in this chunk
    #[serde(default)]
    pub modules: Option<Vec<StatsModule>>,

    /// Parent chunk IDs
    #[serde(default)]
    pub parents: Vec<Id>,
}

/// Represents a module in the webpack build.
///
/// A module either stands for a single source file or, when it carries
/// sub-modules, for a concatenated group of them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsModule {
    /// Module ID, unique within a compilation
    pub id: Option<Id>,

    /// Short module name/path
    pub name: Option<String>,

    /// Alternate spelling of the module path used by some stats producers
    pub path: Option<String>,

    /// Unique module identifier (full request including loaders)
    pub identifier: Option<String>,

    /// Module size in bytes
    #[serde(default)]
    pub size: u64,

    /// Chunk IDs this module belongs to
    #[serde(default)]
    pub chunks: Vec<Id>,

    /// Sub-modules of a concatenated module
    #[serde(default)]
    pub groups: Option<Vec<StatsModule>>,

    /// Webpack's own field for concatenated sub-modules
    #[serde(default)]
    pub modules: Option<Vec<StatsModule>>,
}

impl StatsModule {
    /// The virtual path of this module: the first non-empty of `name`,
    /// `path` and `identifier`.
    pub fn module_path(&self) -> Option<&str> {
        [&self.name, &self.path, &self.identifier]
            .into_iter()
            .filter_map(|candidate| candidate.as_deref())
            .find(|candidate| !candidate.is_empty())
    }

    /// Sub-modules of a concatenated module, if there are any.
    ///
    /// `groups` takes precedence over webpack's `modules` field. An empty
    /// list counts as no sub-modules.
    pub fn sub_modules(&self) -> Option<&[StatsModule]> {
        self.groups
            .as_deref()
            .or(self.modules.as_deref())
            .filter(|groups| !groups.is_empty())
    }
}

/// Chunk and module IDs can be either a number or a string in webpack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Id {
    /// Numeric ID
    Number(u64),
    /// String ID
    String(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl StatsDocument {
    /// Parse a stats document from a JSON file.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use bundlescope::bundle::StatsDocument;
    ///
    /// let stats = StatsDocument::from_file("stats.json")?;
    /// println!("Assets: {}", stats.assets.len());
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StatsError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a stats document from a JSON string.
    pub fn parse(json: &str) -> Result<Self, StatsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The document that actually holds the build data.
    ///
    /// Falls back to the first child compilation when this document has no
    /// assets. Only one level of fallback is applied.
    pub fn effective(&self) -> &StatsDocument {
        match self.children.first() {
            Some(child) if self.assets.is_empty() => child,
            _ => self,
        }
    }
}
