//! Analyzer configuration.
//!
//! [`AnalyzerOptions`] carries the recognised options: which assets to
//! exclude, where the emitted bundles live, and how strictly to treat
//! inconsistent chunk references.

use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound on the time spent parsing bundle files.
pub const DEFAULT_PARSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while building configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An exclude pattern is not a valid regular expression.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single asset exclusion rule.
#[derive(Clone)]
pub enum AssetFilter {
    /// Excludes asset names matching the regular expression.
    Pattern(Regex),
    /// Excludes asset names for which the closure returns true.
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl AssetFilter {
    /// Compile a pattern string into a filter.
    ///
    /// Strings are regular expressions, so `vendor` excludes any asset whose
    /// name contains "vendor" and `^runtime\.` anchors at the start.
    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(AssetFilter::Pattern)
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Wrap a closure into a filter.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        AssetFilter::Predicate(Arc::new(f))
    }

    /// Returns true if this rule excludes the asset name.
    pub fn excludes(&self, asset_name: &str) -> bool {
        match self {
            AssetFilter::Pattern(re) => re.is_match(asset_name),
            AssetFilter::Predicate(f) => f(asset_name),
        }
    }
}

impl fmt::Debug for AssetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetFilter::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            AssetFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A set of exclusion rules. An asset is included when no rule matches.
#[derive(Debug, Clone, Default)]
pub struct ExcludeAssets {
    filters: Vec<AssetFilter>,
}

impl ExcludeAssets {
    /// An empty rule set that includes every asset.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a rule set from pattern strings.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = patterns
            .into_iter()
            .map(|p| AssetFilter::pattern(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }

    /// Add a rule.
    pub fn with(mut self, filter: AssetFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Returns true if the asset name passes every rule.
    pub fn is_included(&self, asset_name: &str) -> bool {
        !self.filters.iter().any(|f| f.excludes(asset_name))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Options controlling one analyzer run.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Assets to leave out of the report
    pub exclude_assets: ExcludeAssets,

    /// Directory holding the emitted bundles. Enables parsed and gzip sizes.
    pub bundle_dir: Option<PathBuf>,

    /// Overall time budget for parsing bundle files
    pub parse_timeout: Duration,

    /// Abort the run when an asset references an unknown chunk, instead of
    /// reporting null chunk metadata for it
    pub strict_chunks: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            exclude_assets: ExcludeAssets::none(),
            bundle_dir: None,
            parse_timeout: DEFAULT_PARSE_TIMEOUT,
            strict_chunks: false,
        }
    }
}

impl AnalyzerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_assets(mut self, exclude: ExcludeAssets) -> Self {
        self.exclude_assets = exclude;
        self
    }

    pub fn bundle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundle_dir = Some(dir.into());
        self
    }

    pub fn parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = timeout;
        self
    }

    pub fn strict_chunks(mut self, strict: bool) -> Self {
        self.strict_chunks = strict;
        self
    }
}
