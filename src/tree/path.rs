//! Virtual module path grammar.
//!
//! Module paths in stats files are webpack requests, not filesystem paths:
//! they may carry loader prefixes (`babel-loader!./src/a.js`), use either
//! slash, and contain the `~` shorthand for `node_modules`. They are split
//! here by string rules only; nothing consults the host's path handling.

/// Delimiter used when joining path segments back together.
pub const PATH_DELIMITER: &str = "/";

const LOADER_SEPARATOR: char = '!';
const MULTI_MODULE_PREFIX: &str = "multi ";

/// Split a module path into its segments.
///
/// Returns an empty vector when nothing usable remains.
///
/// # Example
///
/// ```
/// use bundlescope::tree::path::split_module_path;
///
/// assert_eq!(split_module_path("./src/utils/index.js"), vec!["src", "utils", "index.js"]);
/// assert_eq!(split_module_path("style-loader!./~/lib/a.css"), vec!["node_modules", "lib", "a.css"]);
/// ```
pub fn split_module_path(module_path: &str) -> Vec<String> {
    if module_path.starts_with(MULTI_MODULE_PREFIX) {
        return vec![module_path.to_string()];
    }

    // Loaders are chained with `!`; the request itself comes last
    let request = module_path
        .rsplit(LOADER_SEPARATOR)
        .next()
        .unwrap_or(module_path);

    let mut segments: Vec<&str> = request
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.first() == Some(&".") {
        segments.remove(0);
    }

    segments
        .into_iter()
        .map(|segment| match segment {
            "~" => "node_modules".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Join segments with [`PATH_DELIMITER`].
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PATH_DELIMITER)
}
