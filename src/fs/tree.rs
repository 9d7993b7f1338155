use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::fs::scanner::ScanEntry;

/// Identity of a node: its absolute path, used as an opaque lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(PathBuf);

impl NodeId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl From<&Path> for NodeId {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

/// Type of filesystem node, fixed when the node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// Child list of a node.
///
/// `Unset` and an empty `Loaded` list are different states: the first means the
/// directory was never scanned, the second that it was scanned (or can never
/// have children, as with files).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    Unset,
    Loaded(Vec<TreeNode>),
}

impl Children {
    pub fn is_unset(&self) -> bool {
        matches!(self, Children::Unset)
    }

    /// The loaded child list, or `None` while unset.
    pub fn as_loaded(&self) -> Option<&[TreeNode]> {
        match self {
            Children::Unset => None,
            Children::Loaded(children) => Some(children),
        }
    }
}

/// A node in the directory tree.
///
/// `children` and `is_expanded` are only reachable through methods that keep
/// files childless and never expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub is_hidden: bool,
    children: Children,
    is_expanded: bool,
}

impl TreeNode {
    /// Create a fresh, collapsed node for `path`.
    pub fn new(path: PathBuf, kind: NodeKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self::with_name(name, path, kind)
    }

    /// Create a fresh node from a scanner result.
    pub fn from_entry(entry: ScanEntry) -> Self {
        let kind = if entry.is_dir {
            NodeKind::Directory
        } else {
            NodeKind::File
        };
        Self::with_name(entry.name, entry.path, kind)
    }

    fn with_name(name: String, path: PathBuf, kind: NodeKind) -> Self {
        let children = match kind {
            NodeKind::Directory => Children::Unset,
            NodeKind::File => Children::Loaded(Vec::new()),
        };
        Self {
            id: NodeId::new(path.clone()),
            is_hidden: name.starts_with('.'),
            name,
            path,
            kind,
            children,
            is_expanded: false,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    /// Set the expansion flag. Ignored for files.
    pub fn set_expanded(&mut self, expanded: bool) {
        if self.is_dir() {
            self.is_expanded = expanded;
        }
    }

    /// Replace the child list with a scan result. Ignored for files.
    pub fn set_children(&mut self, children: Vec<TreeNode>) {
        if self.is_dir() {
            self.children = Children::Loaded(children);
        }
    }

    /// Move an unscanned directory to the empty placeholder state.
    ///
    /// Returns `true` if the caller now owns the scan for this node. A second
    /// caller sees `false`, which is what keeps a node from being scanned twice.
    pub fn claim_population(&mut self) -> bool {
        if self.is_dir() && self.children.is_unset() {
            self.children = Children::Loaded(Vec::new());
            true
        } else {
            false
        }
    }
}

/// A directory whose children still have to be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingScan {
    pub id: NodeId,
    pub path: PathBuf,
}

/// Find a node by id. Unset and empty child lists are not descended into.
pub fn find_node<'a>(nodes: &'a [TreeNode], id: &NodeId) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.id == *id {
            return Some(node);
        }
        if let Children::Loaded(children) = &node.children {
            if let Some(found) = find_node(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Find a mutable reference to a node by id, depth-first, left to right.
pub fn find_node_mut<'a>(nodes: &'a mut [TreeNode], id: &NodeId) -> Option<&'a mut TreeNode> {
    for node in nodes.iter_mut() {
        if node.id == *id {
            return Some(node);
        }
        if let Children::Loaded(children) = &mut node.children {
            if let Some(found) = find_node_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Collect the ids of every expanded directory, at any depth.
pub fn collect_expanded_ids(nodes: &[TreeNode]) -> HashSet<NodeId> {
    let mut ids = HashSet::new();
    collect_expanded_into(nodes, &mut ids);
    ids
}

fn collect_expanded_into(nodes: &[TreeNode], ids: &mut HashSet<NodeId>) {
    for node in nodes {
        if node.is_dir() && node.is_expanded {
            ids.insert(node.id.clone());
        }
        if let Children::Loaded(children) = &node.children {
            collect_expanded_into(children, ids);
        }
    }
}

/// Re-expand every directory whose id is in `expanded`.
///
/// Directories that are still unscanned get the empty placeholder and are
/// returned so the caller can schedule their scans.
pub fn restore_expanded(nodes: &mut [TreeNode], expanded: &HashSet<NodeId>) -> Vec<PendingScan> {
    let mut pending = Vec::new();
    restore_expanded_into(nodes, expanded, &mut pending);
    pending
}

fn restore_expanded_into(
    nodes: &mut [TreeNode],
    expanded: &HashSet<NodeId>,
    pending: &mut Vec<PendingScan>,
) {
    for node in nodes.iter_mut() {
        if node.is_dir() && expanded.contains(&node.id) {
            node.is_expanded = true;
            if node.claim_population() {
                pending.push(PendingScan {
                    id: node.id.clone(),
                    path: node.path.clone(),
                });
            }
        }
        if let Children::Loaded(children) = &mut node.children {
            restore_expanded_into(children, expanded, pending);
        }
    }
}

/// A flattened representation of a tree node for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatItem {
    pub id: NodeId,
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_last_sibling: bool,
    pub is_hidden: bool,
}

/// Flatten the visible part of the tree into rows, top to bottom.
///
/// Children are emitted only for expanded directories whose list is loaded.
pub fn flatten(nodes: &[TreeNode]) -> Vec<FlatItem> {
    let mut items = Vec::new();
    flatten_into(nodes, 0, &mut items);
    items
}

fn flatten_into(nodes: &[TreeNode], depth: usize, items: &mut Vec<FlatItem>) {
    for (i, node) in nodes.iter().enumerate() {
        items.push(FlatItem {
            id: node.id.clone(),
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            depth,
            is_expanded: node.is_expanded,
            is_last_sibling: i + 1 == nodes.len(),
            is_hidden: node.is_hidden,
        });

        if node.is_expanded {
            if let Children::Loaded(children) = &node.children {
                flatten_into(children, depth + 1, items);
            }
        }
    }
}
