//! Folder/file tree over module paths.
//!
//! Provides [`Folder`] and [`File`] nodes, the [`ModuleUnit`] input shape
//! the tree is built from, and the compaction pass that collapses chains
//! of single-child folders.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::path::{join_segments, split_module_path, PATH_DELIMITER};
use crate::bundle::stats::StatsModule;
use crate::chart::{ChartFile, ChartFolder, ChartNode};

/// Name of the root folder of every module tree.
pub const ROOT_NAME: &str = ".";

/// A module that could not be placed because a file and a folder compete
/// for its path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Module \"{path}\" ({size} bytes) was left out of the tree: its path is taken by another module")]
pub struct PathConflict {
    /// Virtual path of the dropped module
    pub path: String,
    /// Stats size that is missing from the tree
    pub size: u64,
}

impl PathConflict {
    fn for_unit(unit: &ModuleUnit) -> Self {
        Self {
            path: join_segments(unit.segments()),
            size: unit.size(),
        }
    }
}

/// A module prepared for insertion into the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleUnit {
    /// A single source file.
    Leaf {
        segments: Vec<String>,
        size: u64,
        parsed_src: Option<String>,
    },
    /// A concatenated module. Its own size is ignored: the tree sizes it
    /// from its sub-modules.
    Grouped {
        segments: Vec<String>,
        groups: Vec<ModuleUnit>,
    },
}

impl ModuleUnit {
    /// Convert a stats module, looking up its parsed source by module ID.
    ///
    /// Returns `None` for modules without a usable path.
    pub fn from_stats(
        module: &StatsModule,
        parsed_sources: Option<&HashMap<String, String>>,
    ) -> Option<Self> {
        let segments = split_module_path(module.module_path()?);
        if segments.is_empty() {
            return None;
        }

        let unit = match module.sub_modules() {
            Some(groups) => ModuleUnit::Grouped {
                segments,
                groups: groups
                    .iter()
                    .filter_map(|group| Self::from_stats(group, parsed_sources))
                    .collect(),
            },
            None => ModuleUnit::Leaf {
                segments,
                size: module.size,
                parsed_src: parsed_sources
                    .zip(module.id.as_ref())
                    .and_then(|(sources, id)| sources.get(&id.to_string()))
                    .cloned(),
            },
        };
        Some(unit)
    }

    pub fn segments(&self) -> &[String] {
        match self {
            ModuleUnit::Leaf { segments, .. } | ModuleUnit::Grouped { segments, .. } => segments,
        }
    }

    /// Stats size this unit contributes to a tree.
    pub fn size(&self) -> u64 {
        match self {
            ModuleUnit::Leaf { size, .. } => *size,
            ModuleUnit::Grouped { groups, .. } => groups.iter().map(ModuleUnit::size).sum(),
        }
    }
}

/// A node in the module tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Folder(Folder),
    File(File),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder(folder) => &folder.name,
            TreeNode::File(file) => &file.name,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            TreeNode::Folder(folder) => folder.size(),
            TreeNode::File(file) => file.size,
        }
    }

    pub fn parsed_size(&self) -> Option<u64> {
        match self {
            TreeNode::Folder(folder) => folder.parsed_size(),
            TreeNode::File(file) => file.parsed_size(),
        }
    }

    pub fn to_chart_data(&self) -> ChartNode {
        match self {
            TreeNode::Folder(folder) => ChartNode::Folder(folder.to_chart_data()),
            TreeNode::File(file) => ChartNode::File(file.to_chart_data()),
        }
    }
}

/// A source file leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Last path segment
    pub name: String,
    /// Full virtual path of the module
    pub path: String,
    /// Size reported by the stats file
    pub size: u64,
    /// Module source as found in the emitted bundle
    pub src: Option<String>,
}

impl File {
    /// Byte length of the module's source in the emitted bundle.
    pub fn parsed_size(&self) -> Option<u64> {
        self.src.as_ref().map(|src| src.len() as u64)
    }

    /// Fold another module with the same path into this one.
    fn merge(&mut self, other: File) {
        self.size += other.size;
        self.src = match (self.src.take(), other.src) {
            (Some(mut a), Some(b)) => {
                a.push_str(&b);
                Some(a)
            }
            (a, b) => a.or(b),
        };
    }

    pub fn to_chart_data(&self) -> ChartFile {
        ChartFile {
            label: self.name.clone(),
            size: self.size,
            parsed_size: self.parsed_size(),
            path: self.path.clone(),
        }
    }
}

/// A directory, or a concatenated module, grouping other nodes.
///
/// Sizes are never stored: they are summed from the children on every
/// read. Children stay keyed by the name they were inserted under, so
/// compaction relabels nodes without moving them.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
    concatenated: bool,
    children: BTreeMap<String, TreeNode>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            concatenated: false,
            children: BTreeMap::new(),
        }
    }

    /// A folder standing for one concatenated module.
    pub fn concatenated(name: impl Into<String>) -> Self {
        Self {
            concatenated: true,
            ..Self::new(name)
        }
    }

    pub fn is_concatenated(&self) -> bool {
        self.concatenated
    }

    /// Child nodes, ordered by the name they were inserted under.
    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.values()
    }

    /// First child labelled `name`.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.values().find(|node| node.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Sum of the children's sizes.
    pub fn size(&self) -> u64 {
        self.children.values().map(TreeNode::size).sum()
    }

    /// Sum of the children's parsed sizes, or `None` if no descendant has one.
    pub fn parsed_size(&self) -> Option<u64> {
        self.children
            .values()
            .filter_map(TreeNode::parsed_size)
            .fold(None, |acc, size| Some(acc.unwrap_or(0) + size))
    }

    /// All file leaves under this folder, depth first.
    pub fn files(&self) -> Vec<&File> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, files: &mut Vec<&'a File>) {
        for child in self.children.values() {
            match child {
                TreeNode::Folder(folder) => folder.collect_files(files),
                TreeNode::File(file) => files.push(file),
            }
        }
    }

    /// Insert a module below this folder.
    ///
    /// Intermediate folders are created as needed. A file whose path is
    /// already taken by a file is merged into it. When a folder and a file
    /// compete for the same name the node already in place wins; every
    /// module dropped that way is returned.
    pub fn add_module(&mut self, unit: &ModuleUnit) -> Vec<PathConflict> {
        let mut conflicts = Vec::new();
        self.insert(unit, &mut conflicts);
        conflicts
    }

    fn insert(&mut self, unit: &ModuleUnit, conflicts: &mut Vec<PathConflict>) {
        let Some((last, dirs)) = unit.segments().split_last() else {
            return;
        };

        let mut folder: &mut Folder = self;
        for dir in dirs {
            folder = match folder.child_folder(dir) {
                Some(next) => next,
                None => {
                    conflicts.push(PathConflict::for_unit(unit));
                    return;
                }
            };
        }

        match unit {
            ModuleUnit::Leaf {
                segments,
                size,
                parsed_src,
            } => {
                let file = File {
                    name: last.clone(),
                    path: join_segments(segments),
                    size: *size,
                    src: parsed_src.clone(),
                };
                if let Err(dropped) = folder.add_file(file) {
                    conflicts.push(PathConflict {
                        path: dropped.path,
                        size: dropped.size,
                    });
                }
            }
            ModuleUnit::Grouped { groups, .. } => match folder.concatenated_child(last) {
                Some(group_folder) => {
                    for group in groups {
                        group_folder.insert(group, conflicts);
                    }
                }
                None => conflicts.push(PathConflict::for_unit(unit)),
            },
        }
    }

    /// Get or create a child folder. `None` if a file holds the name.
    fn child_folder(&mut self, name: &str) -> Option<&mut Folder> {
        let node = self
            .children
            .entry(name.to_string())
            .or_insert_with(|| TreeNode::Folder(Folder::new(name)));
        match node {
            TreeNode::Folder(folder) => Some(folder),
            TreeNode::File(_) => None,
        }
    }

    /// Get or create a concatenated module folder. `None` if a file or a
    /// plain directory holds the name.
    fn concatenated_child(&mut self, name: &str) -> Option<&mut Folder> {
        let node = self
            .children
            .entry(name.to_string())
            .or_insert_with(|| TreeNode::Folder(Folder::concatenated(name)));
        match node {
            TreeNode::Folder(folder) if folder.concatenated => Some(folder),
            _ => None,
        }
    }

    /// Add a file, or hand it back if a folder holds its name.
    fn add_file(&mut self, file: File) -> Result<(), File> {
        match self.children.get_mut(&file.name) {
            Some(TreeNode::File(existing)) => existing.merge(file),
            Some(TreeNode::Folder(_)) => return Err(file),
            None => {
                self.children.insert(file.name.clone(), TreeNode::File(file));
            }
        }
        Ok(())
    }

    /// Collapse chains of single-child folders below this folder.
    ///
    /// A folder whose only child is a folder absorbs it: `src` holding only
    /// `utils` becomes `src/utils`. Concatenated modules are boundaries:
    /// they are never absorbed and never absorb their own child, only their
    /// children are compacted. This folder's own name never changes, so the
    /// root stays `.`. Files and sizes are unaffected.
    pub fn merge_nested_folders(&mut self) {
        for node in self.children.values_mut() {
            if let TreeNode::Folder(folder) = node {
                if !folder.concatenated {
                    folder.absorb_single_child_folders();
                }
                folder.merge_nested_folders();
            }
        }
    }

    fn absorb_single_child_folders(&mut self) {
        while self.children.len() == 1 {
            let absorbable = matches!(
                self.children.values().next(),
                Some(TreeNode::Folder(only)) if !only.concatenated
            );
            if !absorbable {
                break;
            }
            if let Some((_, TreeNode::Folder(only))) = self.children.pop_first() {
                self.name = format!("{}{}{}", self.name, PATH_DELIMITER, only.name);
                self.children = only.children;
            }
        }
    }

    /// Chart record for this folder.
    pub fn to_chart_data(&self) -> ChartFolder {
        ChartFolder {
            label: self.name.clone(),
            size: self.size(),
            parsed_size: self.parsed_size(),
            concatenated: self.concatenated,
            groups: self.children.values().map(TreeNode::to_chart_data).collect(),
        }
    }
}

/// Build a compacted tree rooted at `.` from module units.
///
/// Modules that lose a path conflict are logged and left out; use
/// [`build_tree_with_conflicts`] to get them back.
pub fn build_tree<'a, I>(units: I) -> Folder
where
    I: IntoIterator<Item = &'a ModuleUnit>,
{
    let (root, conflicts) = build_tree_with_conflicts(units);
    for conflict in &conflicts {
        debug!("{}", conflict);
    }
    root
}

/// Build a compacted tree rooted at `.` and report every module that was
/// left out of it.
pub fn build_tree_with_conflicts<'a, I>(units: I) -> (Folder, Vec<PathConflict>)
where
    I: IntoIterator<Item = &'a ModuleUnit>,
{
    let mut root = Folder::new(ROOT_NAME);
    let mut conflicts = Vec::new();
    for unit in units {
        root.insert(unit, &mut conflicts);
    }
    root.merge_nested_folders();
    (root, conflicts)
}
