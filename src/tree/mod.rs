//! Module path tree.
//!
//! Builds a directory-style tree over the virtual paths of an asset's
//! modules and compacts single-child folder chains.
//!
//! # Example
//!
//! ```
//! use bundlescope::tree::{build_tree, ModuleUnit};
//! use bundlescope::tree::path::split_module_path;
//!
//! let units = vec![
//!     ModuleUnit::Leaf { segments: split_module_path("./src/utils/a.js"), size: 10, parsed_src: None },
//!     ModuleUnit::Leaf { segments: split_module_path("./src/utils/b.js"), size: 20, parsed_src: None },
//! ];
//! let tree = build_tree(&units);
//!
//! assert_eq!(tree.size(), 30);
//! assert!(tree.child("src/utils").is_some());
//! ```

mod node;
pub mod path;

pub use node::{
    build_tree, build_tree_with_conflicts, File, Folder, ModuleUnit, PathConflict, TreeNode,
    ROOT_NAME,
};
