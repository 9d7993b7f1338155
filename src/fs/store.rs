//! Owner of the live tree.
//!
//! All mutation goes through a `watch` channel: each closure runs under the
//! channel's write lock against the latest committed value, so concurrent
//! merges are applied one after another and never from a stale copy. Readers
//! get cloned snapshots whose node list is shared copy-on-write.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::fs::tree::{self, NodeId, PendingScan, TreeNode};

/// The tree as published to consumers.
#[derive(Debug, Clone, Default)]
pub struct TreeSnapshot {
    /// `None` until a directory has been loaded.
    pub root_path: Option<PathBuf>,
    pub nodes: Arc<Vec<TreeNode>>,
    pub show_hidden: bool,
    /// Bumped by every root load or refresh request.
    pub generation: u64,
}

/// Root identity captured when a load or refresh is requested.
///
/// A commit made with a ticket that is no longer current is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTicket {
    pub root: PathBuf,
    pub generation: u64,
    pub show_hidden: bool,
}

/// Generation and hidden-file policy a child scan runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanScope {
    pub generation: u64,
    pub show_hidden: bool,
}

impl RootTicket {
    pub fn scope(&self) -> ScanScope {
        ScanScope {
            generation: self.generation,
            show_hidden: self.show_hidden,
        }
    }
}

/// Work left after a refresh commit.
#[derive(Debug, Clone)]
pub struct Restoration {
    /// Ids that were expanded before the refresh.
    pub expanded: Arc<HashSet<NodeId>>,
    /// Re-expanded directories that still need a scan.
    pub pending: Vec<PendingScan>,
}

impl TreeSnapshot {
    fn is_current(&self, ticket: &RootTicket) -> bool {
        self.generation == ticket.generation && self.root_path.as_ref() == Some(&ticket.root)
    }
}

/// Serialized owner of the tree snapshot.
pub struct TreeStore {
    state: watch::Sender<TreeSnapshot>,
}

impl TreeStore {
    pub fn new(show_hidden: bool) -> Self {
        let (state, _) = watch::channel(TreeSnapshot {
            show_hidden,
            ..TreeSnapshot::default()
        });
        Self { state }
    }

    /// Current snapshot. Later commits never show through it.
    pub fn snapshot(&self) -> TreeSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every committed change.
    pub fn subscribe(&self) -> watch::Receiver<TreeSnapshot> {
        self.state.subscribe()
    }

    pub fn root_path(&self) -> Option<PathBuf> {
        self.state.borrow().root_path.clone()
    }

    pub fn show_hidden(&self) -> bool {
        self.state.borrow().show_hidden
    }

    /// Scope for a child scan scheduled now.
    pub fn scan_scope(&self) -> ScanScope {
        let state = self.state.borrow();
        ScanScope {
            generation: state.generation,
            show_hidden: state.show_hidden,
        }
    }

    /// Look up a node in the current snapshot.
    pub fn find(&self, id: &NodeId) -> Option<TreeNode> {
        tree::find_node(&self.state.borrow().nodes, id).cloned()
    }

    /// Switch to a new root and start a new generation.
    ///
    /// The old nodes stay visible until the new root's scan commits.
    pub fn begin_load(&self, root: PathBuf) -> RootTicket {
        let mut generation = 0;
        let mut show_hidden = false;
        self.state.send_modify(|state| {
            state.root_path = Some(root.clone());
            state.generation += 1;
            generation = state.generation;
            show_hidden = state.show_hidden;
        });
        RootTicket {
            root,
            generation,
            show_hidden,
        }
    }

    /// Start a new generation for the current root, or `None` if no root is loaded.
    pub fn begin_refresh(&self) -> Option<RootTicket> {
        let mut ticket = None;
        // The generation bump alone is not a visible change.
        self.state.send_if_modified(|state| {
            if let Some(root) = state.root_path.clone() {
                state.generation += 1;
                ticket = Some(RootTicket {
                    root,
                    generation: state.generation,
                    show_hidden: state.show_hidden,
                });
            }
            false
        });
        ticket
    }

    /// Flip the hidden-file flag and return its new value.
    pub fn toggle_show_hidden(&self) -> bool {
        let mut show_hidden = false;
        self.state.send_modify(|state| {
            state.show_hidden = !state.show_hidden;
            show_hidden = state.show_hidden;
        });
        show_hidden
    }

    /// Replace the whole node list unconditionally.
    ///
    /// The unguarded primitive: scan completions go through
    /// `replace_if_current` or `commit_refresh` instead, which drop results
    /// from superseded requests.
    pub fn replace_all(&self, nodes: Vec<TreeNode>) {
        self.state.send_modify(|state| {
            state.nodes = Arc::new(nodes);
        });
    }

    /// Replace the node list if `ticket` is still the current generation.
    pub fn replace_if_current(&self, ticket: &RootTicket, nodes: Vec<TreeNode>) -> bool {
        self.state.send_if_modified(|state| {
            if !state.is_current(ticket) {
                debug!(
                    root = %ticket.root.display(),
                    generation = ticket.generation,
                    current = state.generation,
                    "discarding superseded root scan"
                );
                return false;
            }
            state.nodes = Arc::new(nodes);
            true
        })
    }

    /// Commit a rescanned root, carrying expansion state over by id.
    ///
    /// The expanded set is read from the snapshot being replaced. Returns
    /// `None` if `ticket` was superseded.
    pub fn commit_refresh(
        &self,
        ticket: &RootTicket,
        mut nodes: Vec<TreeNode>,
    ) -> Option<Restoration> {
        let mut restoration = None;
        self.state.send_if_modified(|state| {
            if !state.is_current(ticket) {
                debug!(
                    root = %ticket.root.display(),
                    generation = ticket.generation,
                    current = state.generation,
                    "discarding superseded refresh"
                );
                return false;
            }
            let expanded = tree::collect_expanded_ids(&state.nodes);
            let pending = tree::restore_expanded(&mut nodes, &expanded);
            state.nodes = Arc::new(nodes);
            restoration = Some(Restoration {
                expanded: Arc::new(expanded),
                pending,
            });
            true
        });
        restoration
    }

    /// Apply `transform` to the node with key `id` in the latest snapshot.
    ///
    /// Returns whether a node was found; nothing is published on a miss.
    pub fn apply_at<F>(&self, id: &NodeId, transform: F) -> bool
    where
        F: FnOnce(&mut TreeNode),
    {
        self.apply_where(None, id, transform)
    }

    /// Like `apply_at`, but only while `generation` is still current.
    ///
    /// Child scans use this so a listing made before a later load or refresh
    /// never lands on that request's result.
    pub fn apply_if_current<F>(&self, generation: u64, id: &NodeId, transform: F) -> bool
    where
        F: FnOnce(&mut TreeNode),
    {
        self.apply_where(Some(generation), id, transform)
    }

    fn apply_where<F>(&self, generation: Option<u64>, id: &NodeId, transform: F) -> bool
    where
        F: FnOnce(&mut TreeNode),
    {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if let Some(generation) = generation {
                if state.generation != generation {
                    debug!(
                        id = %id.as_path().display(),
                        generation,
                        current = state.generation,
                        "discarding superseded child scan"
                    );
                    return false;
                }
            }
            if tree::find_node(&state.nodes, id).is_none() {
                return false;
            }
            let nodes = Arc::make_mut(&mut state.nodes);
            if let Some(node) = tree::find_node_mut(nodes, id) {
                transform(node);
                applied = true;
            }
            applied
        });
        applied
    }
}
