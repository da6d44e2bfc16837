//! Emitted bundle sources.
//!
//! When the directory holding the emitted bundles is known, each asset's
//! file is read to measure its real (minified) size and its gzip size. The
//! parser and the compression sizer are traits so callers can plug in a
//! parser that also splits the bundle into per-module sources.
//!
//! Parsing runs on a small worker pool. The collector waits at most the
//! configured timeout in total; bundles that have not been parsed by then
//! are reported as failed and the run continues without them.

use crossbeam_channel::{unbounded, RecvTimeoutError};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::warnings::Warnings;

/// Per-module sources keyed by the module ID's string form.
pub type ModuleSources = HashMap<String, String>;

/// Errors raised while reading one bundle file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The bundle file does not exist.
    #[error("no such file")]
    NotFound(PathBuf),

    /// The bundle file could not be read.
    #[error("{source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bundle file was read but could not be parsed.
    #[error("{message}")]
    Parse { path: PathBuf, message: String },

    /// The parser did not finish within the time budget.
    #[error("timed out")]
    TimedOut(PathBuf),
}

/// Source text of one emitted bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleSource {
    /// Whole bundle text
    pub src: String,
    /// Source of each module found in the bundle
    pub modules: ModuleSources,
}

/// Reads an emitted bundle file.
pub trait BundleParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<BundleSource, SourceError>;
}

/// Reads the bundle as text without splitting it into modules.
///
/// Gives asset-level parsed and gzip sizes only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBundleReader;

impl BundleParser for RawBundleReader {
    fn parse(&self, path: &Path) -> Result<BundleSource, SourceError> {
        match fs::read_to_string(path) {
            Ok(src) => Ok(BundleSource {
                src,
                modules: ModuleSources::new(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(SourceError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Measures the compressed size of a text.
pub trait CompressionSizer: Send + Sync {
    fn compressed_size(&self, text: &str) -> io::Result<u64>;
}

/// Gzip size at a fixed compression level (best by default).
#[derive(Debug, Clone, Copy)]
pub struct GzipSizer {
    level: Compression,
}

impl GzipSizer {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for GzipSizer {
    fn default() -> Self {
        Self {
            level: Compression::best(),
        }
    }
}

impl CompressionSizer for GzipSizer {
    fn compressed_size(&self, text: &str) -> io::Result<u64> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder.write_all(text.as_bytes())?;
        let compressed = encoder.finish()?;
        Ok(compressed.len() as u64)
    }
}

/// Bundle sources gathered for a run.
#[derive(Debug, Clone, Default)]
pub struct ParsedBundles {
    /// Bundle text by asset name
    pub sources: HashMap<String, String>,
    /// Module sources of every parsed bundle. A later bundle overrides an
    /// earlier one for the same module ID.
    pub modules: ModuleSources,
}

impl ParsedBundles {
    pub fn source(&self, asset_name: &str) -> Option<&str> {
        self.sources.get(asset_name).map(String::as_str)
    }
}

type ParseJob = (usize, PathBuf);
type ParseOutcome = (usize, Result<BundleSource, SourceError>);

/// Parse the bundle of every asset found under `bundle_dir`.
///
/// Failures are reported per asset and skipped. When no bundle could be
/// parsed at all, a single summary warning is emitted and `None` returned so
/// the run falls back to stats sizes only.
pub fn parse_bundles(
    bundle_dir: &Path,
    asset_names: &[String],
    parser: Arc<dyn BundleParser>,
    timeout: Duration,
    warnings: &mut Warnings,
) -> Option<ParsedBundles> {
    let paths: Vec<PathBuf> = asset_names.iter().map(|name| bundle_dir.join(name)).collect();
    let mut outcomes = run_parsers(&paths, parser, timeout);

    let mut parsed = ParsedBundles::default();
    for (i, name) in asset_names.iter().enumerate() {
        let outcome = outcomes
            .remove(&i)
            .unwrap_or_else(|| Err(SourceError::TimedOut(paths[i].clone())));

        match outcome {
            Ok(bundle) => {
                parsed.modules.extend(bundle.modules);
                parsed.sources.insert(name.clone(), bundle.src);
            }
            Err(e) => warnings.push(format!(
                "Error parsing bundle asset \"{}\": {}",
                paths[i].display(),
                e
            )),
        }
    }

    if parsed.sources.is_empty() {
        warnings.push(
            "No bundles were parsed. Analyzer will show only original module sizes from stats file.",
        );
        return None;
    }

    Some(parsed)
}

/// Run the parser over `paths` on a worker pool.
///
/// Returns whatever finished before the deadline, keyed by path index.
fn run_parsers(
    paths: &[PathBuf],
    parser: Arc<dyn BundleParser>,
    timeout: Duration,
) -> HashMap<usize, Result<BundleSource, SourceError>> {
    let mut outcomes = HashMap::with_capacity(paths.len());
    if paths.is_empty() {
        return outcomes;
    }

    let (job_tx, job_rx) = unbounded::<ParseJob>();
    let (result_tx, result_rx) = unbounded::<ParseOutcome>();

    for job in paths.iter().cloned().enumerate() {
        // Receiver is alive in this scope
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let worker_count = num_cpus::get().clamp(1, paths.len());
    let mut spawned = 0;
    for n in 0..worker_count {
        let jobs = job_rx.clone();
        let results = result_tx.clone();
        let parser = Arc::clone(&parser);
        let spawn = thread::Builder::new()
            .name(format!("bundle-parser-{}", n))
            .spawn(move || {
                for (i, path) in jobs.iter() {
                    debug!("Parsing bundle {}", path.display());
                    if results.send((i, parser.parse(&path))).is_err() {
                        break;
                    }
                }
            });
        match spawn {
            Ok(_) => spawned += 1,
            Err(e) => debug!("Could not spawn bundle parser thread: {}", e),
        }
    }
    drop(result_tx);

    if spawned == 0 {
        // No threads available: parse inline
        for (i, path) in job_rx.try_iter() {
            outcomes.insert(i, parser.parse(&path));
        }
        return outcomes;
    }

    let deadline = Instant::now() + timeout;
    while outcomes.len() < paths.len() {
        match result_rx.recv_deadline(deadline) {
            Ok((i, outcome)) => {
                outcomes.insert(i, outcome);
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct MapParser {
        bundles: HashMap<String, BundleSource>,
    }

    impl BundleParser for MapParser {
        fn parse(&self, path: &Path) -> Result<BundleSource, SourceError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            match self.bundles.get(&name) {
                Some(bundle) => Ok(bundle.clone()),
                None if name.starts_with("broken") => Err(SourceError::Parse {
                    path: path.to_path_buf(),
                    message: "unexpected token".to_string(),
                }),
                None => Err(SourceError::NotFound(path.to_path_buf())),
            }
        }
    }

    struct SlowParser;

    impl BundleParser for SlowParser {
        fn parse(&self, path: &Path) -> Result<BundleSource, SourceError> {
            if path.ends_with("slow.js") {
                thread::sleep(Duration::from_secs(5));
            }
            Ok(BundleSource {
                src: "x".to_string(),
                modules: ModuleSources::new(),
            })
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn bundle(src: &str, modules: &[(&str, &str)]) -> BundleSource {
        BundleSource {
            src: src.to_string(),
            modules: modules
                .iter()
                .map(|(id, s)| (id.to_string(), s.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_raw_reader_reads_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.js"), "console.log(1);").unwrap();

        let source = RawBundleReader.parse(&dir.path().join("main.js")).unwrap();
        assert_eq!(source.src, "console.log(1);");
        assert!(source.modules.is_empty());
    }

    #[test]
    fn test_raw_reader_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = RawBundleReader.parse(&dir.path().join("nope.js")).unwrap_err();

        assert!(matches!(err, SourceError::NotFound(_)));
        assert_eq!(err.to_string(), "no such file");
    }

    #[test]
    fn test_gzip_sizer_compresses() {
        let text = "abcdefgh".repeat(1000);
        let size = GzipSizer::default().compressed_size(&text).unwrap();

        assert!(size > 0);
        assert!(size < text.len() as u64);
    }

    #[test]
    fn test_gzip_sizer_levels_agree_on_empty() {
        let best = GzipSizer::default().compressed_size("").unwrap();
        let fast = GzipSizer::new(1).compressed_size("").unwrap();
        assert!(best > 0);
        assert!(fast > 0);
    }

    #[test]
    fn test_parse_bundles_collects_sources() {
        let parser = MapParser {
            bundles: HashMap::from([
                ("a.js".to_string(), bundle("AAA", &[("1", "a1"), ("2", "a2")])),
                ("b.js".to_string(), bundle("BB", &[("2", "b2")])),
            ]),
        };
        let mut warnings = Warnings::default();

        let parsed = parse_bundles(
            Path::new("dist"),
            &names(&["a.js", "b.js"]),
            Arc::new(parser),
            Duration::from_secs(5),
            &mut warnings,
        )
        .unwrap();

        assert!(warnings.is_empty());
        assert_eq!(parsed.source("a.js"), Some("AAA"));
        assert_eq!(parsed.source("b.js"), Some("BB"));
        assert_eq!(parsed.modules["1"], "a1");
        // Later asset wins for a shared module ID
        assert_eq!(parsed.modules["2"], "b2");
    }

    #[test]
    fn test_parse_bundles_partial_failure() {
        let parser = MapParser {
            bundles: HashMap::from([("a.js".to_string(), bundle("AAA", &[]))]),
        };
        let mut warnings = Warnings::default();

        let parsed = parse_bundles(
            Path::new("dist"),
            &names(&["a.js", "missing.js", "broken.js"]),
            Arc::new(parser),
            Duration::from_secs(5),
            &mut warnings,
        )
        .unwrap();

        assert_eq!(parsed.sources.len(), 1);
        let messages = warnings.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("missing.js") && messages[0].ends_with("no such file"));
        assert!(messages[1].contains("broken.js") && messages[1].ends_with("unexpected token"));
    }

    #[test]
    fn test_parse_bundles_total_failure() {
        let dir = TempDir::new().unwrap();
        let mut warnings = Warnings::default();

        let parsed = parse_bundles(
            dir.path(),
            &names(&["a.js", "b.js"]),
            Arc::new(RawBundleReader),
            Duration::from_secs(5),
            &mut warnings,
        );

        assert!(parsed.is_none());
        let messages = warnings.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[2].starts_with("No bundles were parsed"));
    }

    #[test]
    fn test_parse_bundles_times_out_slow_asset() {
        let mut warnings = Warnings::default();

        let parsed = parse_bundles(
            Path::new("dist"),
            &names(&["fast.js", "slow.js"]),
            Arc::new(SlowParser),
            Duration::from_millis(500),
            &mut warnings,
        )
        .unwrap();

        assert_eq!(parsed.source("fast.js"), Some("x"));
        assert!(parsed.source("slow.js").is_none());
        assert!(warnings.messages()[0].ends_with("timed out"));
    }

    #[test]
    fn test_parse_bundles_reads_real_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.js"), "var a = 1;").unwrap();
        let mut warnings = Warnings::default();

        let parsed = parse_bundles(
            dir.path(),
            &names(&["main.js"]),
            Arc::new(RawBundleReader),
            Duration::from_secs(5),
            &mut warnings,
        )
        .unwrap();

        assert_eq!(parsed.source("main.js"), Some("var a = 1;"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_bundles_no_assets() {
        let mut warnings = Warnings::default();
        let parsed = parse_bundles(
            Path::new("dist"),
            &[],
            Arc::new(RawBundleReader),
            Duration::from_secs(1),
            &mut warnings,
        );

        assert!(parsed.is_none());
        assert_eq!(warnings.messages().len(), 1);
    }
}
