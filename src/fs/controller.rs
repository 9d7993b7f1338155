//! Operation surface for the directory tree.
//!
//! Every operation returns immediately. Scans run on the blocking pool and
//! report back through the store's serialized entry points, so completions
//! may arrive in any order without losing each other's results.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::fs::scanner::{self, DirScanner, FsScanner, ScanEntry};
use crate::fs::store::{ScanScope, TreeSnapshot, TreeStore};
use crate::fs::tree::{self, NodeId, PendingScan, TreeNode};

/// Drives scans and funnels their results into a [`TreeStore`].
///
/// Cheap to clone; clones share the same tree.
#[derive(Clone)]
pub struct TreeController {
    inner: Arc<Inner>,
}

struct Inner {
    store: TreeStore,
    scanner: Arc<dyn DirScanner>,
    runtime: Handle,
    in_flight: watch::Sender<usize>,
}

/// Counts one scheduled scan until dropped.
struct InFlight {
    inner: Arc<Inner>,
}

impl InFlight {
    fn new(inner: &Arc<Inner>) -> Self {
        inner.in_flight.send_modify(|n| *n += 1);
        Self {
            inner: Arc::clone(inner),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.inner
            .in_flight
            .send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl TreeController {
    /// Create a controller that scans with `scanner`.
    ///
    /// Must be called from inside a tokio runtime; scans are spawned on it.
    pub fn new(scanner: Arc<dyn DirScanner>, show_hidden: bool) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| AppError::Runtime(e.to_string()))?;
        let (in_flight, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(Inner {
                store: TreeStore::new(show_hidden),
                scanner,
                runtime,
                in_flight,
            }),
        })
    }

    /// Create a controller backed by the local filesystem.
    pub fn with_fs(show_hidden: bool) -> Result<Self> {
        Self::new(Arc::new(FsScanner), show_hidden)
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<TreeSnapshot> {
        self.inner.store.subscribe()
    }

    pub fn store(&self) -> &TreeStore {
        &self.inner.store
    }

    /// Load `path` as the new root.
    ///
    /// The scanned top level replaces the tree only if no newer load or
    /// refresh was requested in the meantime.
    pub fn load_directory(&self, path: impl Into<PathBuf>) {
        let ticket = self.inner.store.begin_load(path.into());
        info!(root = %ticket.root.display(), generation = ticket.generation, "loading directory");

        let guard = InFlight::new(&self.inner);
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(async move {
            let _guard = guard;
            let nodes = inner.scan_nodes(ticket.root.clone(), ticket.show_hidden).await;
            if inner.store.replace_if_current(&ticket, nodes) {
                debug!(root = %ticket.root.display(), "root loaded");
            }
        });
    }

    /// Flip the expansion of the directory `id`.
    ///
    /// The first expansion of an unscanned directory schedules its scan.
    /// Returns `false` if `id` is unknown or not a directory.
    pub fn toggle_expand(&self, id: &NodeId) -> bool {
        let mut is_dir = false;
        let mut pending = None;
        self.inner.store.apply_at(id, |node| {
            if !node.is_dir() {
                return;
            }
            is_dir = true;
            node.set_expanded(!node.is_expanded());
            if node.is_expanded() && node.claim_population() {
                pending = Some(PendingScan {
                    id: node.id.clone(),
                    path: node.path.clone(),
                });
            }
        });
        if let Some(pending) = pending {
            let scope = self.inner.store.scan_scope();
            self.inner.schedule_child_scan(pending, scope, None);
        }
        is_dir
    }

    /// Rescan the root, keeping every expanded directory expanded by path.
    ///
    /// No-op when no root is loaded.
    pub fn refresh(&self) {
        let Some(ticket) = self.inner.store.begin_refresh() else {
            return;
        };
        info!(root = %ticket.root.display(), generation = ticket.generation, "refreshing");

        let guard = InFlight::new(&self.inner);
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(async move {
            let _guard = guard;
            let nodes = inner.scan_nodes(ticket.root.clone(), ticket.show_hidden).await;
            // Restoration scans start only once their targets are committed.
            if let Some(restoration) = inner.store.commit_refresh(&ticket, nodes) {
                debug!(restoring = restoration.pending.len(), "refresh committed");
                for scan in restoration.pending {
                    inner.schedule_child_scan(
                        scan,
                        ticket.scope(),
                        Some(Arc::clone(&restoration.expanded)),
                    );
                }
            }
        });
    }

    /// Flip hidden-file visibility, then refresh.
    pub fn toggle_hidden_files(&self) {
        let show_hidden = self.inner.store.toggle_show_hidden();
        info!(show_hidden, "toggled hidden files");
        self.refresh();
    }

    /// Number of scans scheduled and not yet merged.
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.borrow()
    }

    /// Wait until every scheduled scan has been merged.
    ///
    /// Scans scheduled by completions (restoration after refresh) are counted
    /// before their parent scan finishes, so this never returns early.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.in_flight.subscribe();
        // The sender lives in `self`, so this can't observe a closed channel.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Inner {
    async fn scan_nodes(&self, path: PathBuf, show_hidden: bool) -> Vec<TreeNode> {
        let entries: Vec<ScanEntry> =
            scanner::scan_off_thread(Arc::clone(&self.scanner), path, show_hidden).await;
        entries.into_iter().map(TreeNode::from_entry).collect()
    }

    /// Scan a placeholder directory and merge its children by id.
    ///
    /// With `expanded`, the scanned children are re-expanded from that set
    /// before merging and their own scans follow, so nested expansion
    /// survives a refresh level by level.
    fn schedule_child_scan(
        self: &Arc<Self>,
        scan: PendingScan,
        scope: ScanScope,
        expanded: Option<Arc<HashSet<NodeId>>>,
    ) {
        let guard = InFlight::new(self);
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            let _guard = guard;
            let PendingScan { id, path } = scan;
            let mut children = inner.scan_nodes(path, scope.show_hidden).await;
            let nested = match &expanded {
                Some(set) => tree::restore_expanded(&mut children, set),
                None => Vec::new(),
            };
            let count = children.len();
            if !inner
                .store
                .apply_if_current(scope.generation, &id, |node| node.set_children(children))
            {
                debug!(id = %id.as_path().display(), "target gone or superseded, dropping scan result");
                return;
            }
            debug!(id = %id.as_path().display(), count, "merged children");
            for scan in nested {
                inner.schedule_child_scan(scan, scope, expanded.clone());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::tree::{find_node, Children, NodeKind};
    use std::collections::{HashMap, VecDeque};
    use std::fs::{self, File};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Real filesystem scans, counted per path.
    #[derive(Default)]
    struct CountingScanner {
        calls: Mutex<HashMap<PathBuf, usize>>,
        total: AtomicUsize,
    }

    impl CountingScanner {
        fn calls_for(&self, path: &Path) -> usize {
            self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
        }
    }

    impl DirScanner for CountingScanner {
        fn scan(&self, path: &Path, show_hidden: bool) -> Vec<ScanEntry> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(path.to_path_buf())
                .or_insert(0) += 1;
            self.total.fetch_add(1, Ordering::SeqCst);
            scanner::scan(path, show_hidden)
        }
    }

    /// Real filesystem scans that block on a per-path gate until released.
    #[derive(Default)]
    struct GatedScanner {
        gates: Mutex<HashMap<PathBuf, mpsc::Receiver<()>>>,
    }

    impl GatedScanner {
        fn gate(&self, path: &Path) -> mpsc::Sender<()> {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().unwrap().insert(path.to_path_buf(), rx);
            tx
        }
    }

    impl DirScanner for GatedScanner {
        fn scan(&self, path: &Path, show_hidden: bool) -> Vec<ScanEntry> {
            let gate = self.gates.lock().unwrap().remove(path);
            if let Some(rx) = gate {
                let _ = rx.recv();
            }
            scanner::scan(path, show_hidden)
        }
    }

    /// Scans of one path wait on a queue of gates, one per call, and report
    /// each call as it starts.
    struct HoldingScanner {
        held: PathBuf,
        gates: Mutex<VecDeque<mpsc::Receiver<()>>>,
        entered: tokio::sync::mpsc::UnboundedSender<()>,
    }

    impl HoldingScanner {
        fn new(held: &Path) -> (Self, tokio::sync::mpsc::UnboundedReceiver<()>) {
            let (entered, rx) = tokio::sync::mpsc::unbounded_channel();
            let scanner = Self {
                held: held.to_path_buf(),
                gates: Mutex::new(VecDeque::new()),
                entered,
            };
            (scanner, rx)
        }

        /// Hold the next call that has no gate yet.
        fn gate(&self) -> mpsc::Sender<()> {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }
    }

    impl DirScanner for HoldingScanner {
        fn scan(&self, path: &Path, show_hidden: bool) -> Vec<ScanEntry> {
            if path == self.held {
                let gate = self.gates.lock().unwrap().pop_front();
                let _ = self.entered.send(());
                if let Some(rx) = gate {
                    let _ = rx.recv();
                }
            }
            scanner::scan(path, show_hidden)
        }
    }

    async fn next_entry(rx: &mut tokio::sync::mpsc::UnboundedReceiver<()>) {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for scan to start")
            .expect("scanner dropped");
    }

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        File::create(dir.path().join("a").join("b").join("deep.txt")).unwrap();
        File::create(dir.path().join("a").join("inner.txt")).unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();
        File::create(dir.path().join("c").join("one.rs")).unwrap();
        File::create(dir.path().join("root.md")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        dir
    }

    fn id(path: impl Into<PathBuf>) -> NodeId {
        NodeId::new(path)
    }

    fn names(nodes: &[TreeNode]) -> Vec<String> {
        nodes.iter().map(|n| n.name.clone()).collect()
    }

    fn child_names(ctl: &TreeController, path: &Path) -> Option<Vec<String>> {
        let node = ctl.store().find(&id(path))?;
        node.children().as_loaded().map(names)
    }

    /// Poll the store until `pred` holds, failing after a generous timeout.
    async fn wait_until(ctl: &TreeController, pred: impl Fn(&TreeSnapshot) -> bool) {
        let mut rx = ctl.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
            .await
            .expect("timed out waiting for tree state")
            .unwrap();
    }

    /// Expanded, scanned-as-empty directory: the state a restoration leaves behind.
    fn is_placeholder(snap: &TreeSnapshot, path: &Path) -> bool {
        find_node(&snap.nodes, &id(path))
            .map(|n| n.is_expanded() && n.children() == &Children::Loaded(Vec::new()))
            .unwrap_or(false)
    }

    async fn loaded(scanner: Arc<dyn DirScanner>, root: &Path) -> TreeController {
        let ctl = TreeController::new(scanner, false).unwrap();
        ctl.load_directory(root);
        ctl.wait_idle().await;
        ctl
    }

    #[test]
    fn new_outside_runtime_is_an_error() {
        let result = TreeController::with_fs(false);
        assert!(matches!(result, Err(AppError::Runtime(_))));
    }

    #[tokio::test]
    async fn load_directory_populates_top_level() {
        let dir = setup_test_dir();
        let ctl = loaded(Arc::new(FsScanner), dir.path()).await;

        let snap = ctl.snapshot();
        assert_eq!(snap.root_path.as_deref(), Some(dir.path()));
        assert_eq!(names(&snap.nodes), vec!["a", "c", "root.md"]);
        assert!(snap.nodes[0].children().is_unset());
        assert_eq!(snap.nodes[2].children(), &Children::Loaded(Vec::new()));
        assert!(snap.nodes.iter().all(|n| !n.is_expanded()));
    }

    #[tokio::test]
    async fn load_missing_directory_yields_empty_tree() {
        let dir = TempDir::new().unwrap();
        let ctl = loaded(Arc::new(FsScanner), &dir.path().join("gone")).await;
        assert!(ctl.snapshot().nodes.is_empty());
    }

    #[tokio::test]
    async fn toggle_expand_scans_once() {
        let dir = setup_test_dir();
        let scanner = Arc::new(CountingScanner::default());
        let ctl = loaded(scanner.clone(), dir.path()).await;
        let a = dir.path().join("a");

        assert!(ctl.toggle_expand(&id(&a)));
        ctl.wait_idle().await;
        assert_eq!(child_names(&ctl, &a), Some(vec!["b".into(), "inner.txt".into()]));
        assert!(ctl.store().find(&id(&a)).unwrap().is_expanded());

        // Collapse keeps children; re-expand doesn't rescan.
        assert!(ctl.toggle_expand(&id(&a)));
        assert!(!ctl.store().find(&id(&a)).unwrap().is_expanded());
        assert_eq!(child_names(&ctl, &a).map(|c| c.len()), Some(2));
        assert!(ctl.toggle_expand(&id(&a)));
        ctl.wait_idle().await;
        assert_eq!(scanner.calls_for(&a), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rapid_double_toggle_issues_one_scan() {
        let dir = setup_test_dir();
        let gated = Arc::new(GatedScanner::default());
        let ctl = loaded(gated.clone(), dir.path()).await;
        let c = dir.path().join("c");
        let release = gated.gate(&c);

        ctl.toggle_expand(&id(&c));
        ctl.toggle_expand(&id(&c));
        ctl.toggle_expand(&id(&c));
        assert_eq!(ctl.in_flight(), 1);

        release.send(()).unwrap();
        ctl.wait_idle().await;
        let node = ctl.store().find(&id(&c)).unwrap();
        assert!(node.is_expanded());
        assert_eq!(child_names(&ctl, &c), Some(vec!["one.rs".into()]));
    }

    #[tokio::test]
    async fn toggle_expand_on_file_is_noop() {
        let dir = setup_test_dir();
        let ctl = loaded(Arc::new(FsScanner), dir.path()).await;
        let file = dir.path().join("root.md");

        assert!(!ctl.toggle_expand(&id(&file)));
        assert!(!ctl.toggle_expand(&id(dir.path().join("nope"))));
        assert_eq!(ctl.in_flight(), 0);
        let node = ctl.store().find(&id(&file)).unwrap();
        assert_eq!(node.kind, NodeKind::File);
        assert!(!node.is_expanded());
    }

    #[tokio::test]
    async fn refresh_preserves_nested_expansion() {
        let dir = setup_test_dir();
        let ctl = loaded(Arc::new(FsScanner), dir.path()).await;
        let a = dir.path().join("a");
        let b = a.join("b");

        ctl.toggle_expand(&id(&a));
        ctl.wait_idle().await;
        ctl.toggle_expand(&id(&b));
        ctl.wait_idle().await;

        File::create(dir.path().join("added.txt")).unwrap();
        ctl.refresh();
        ctl.wait_idle().await;

        let snap = ctl.snapshot();
        assert!(snap.nodes.iter().any(|n| n.name == "added.txt"));
        let a_node = find_node(&snap.nodes, &id(&a)).unwrap();
        let b_node = find_node(&snap.nodes, &id(&b)).unwrap();
        assert!(a_node.is_expanded());
        assert!(b_node.is_expanded());
        assert_eq!(child_names(&ctl, &b), Some(vec!["deep.txt".into()]));
    }

    #[tokio::test]
    async fn refresh_without_root_is_noop() {
        let ctl = TreeController::with_fs(false).unwrap();
        ctl.refresh();
        assert_eq!(ctl.in_flight(), 0);
        assert!(ctl.snapshot().root_path.is_none());
    }

    #[tokio::test]
    async fn refresh_drops_expansion_of_removed_dir() {
        let dir = setup_test_dir();
        let ctl = loaded(Arc::new(FsScanner), dir.path()).await;
        let c = dir.path().join("c");
        ctl.toggle_expand(&id(&c));
        ctl.wait_idle().await;

        fs::rename(&c, dir.path().join("c2")).unwrap();
        ctl.refresh();
        ctl.wait_idle().await;

        let snap = ctl.snapshot();
        assert!(find_node(&snap.nodes, &id(&c)).is_none());
        let renamed = find_node(&snap.nodes, &id(dir.path().join("c2"))).unwrap();
        assert!(!renamed.is_expanded());
        assert!(renamed.children().is_unset());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_restorations_both_land_in_either_order() {
        for b_first in [true, false] {
            let dir = setup_test_dir();
            let gated = Arc::new(GatedScanner::default());
            let ctl = loaded(gated.clone(), dir.path()).await;
            let a = dir.path().join("a");
            let c = dir.path().join("c");
            ctl.toggle_expand(&id(&a));
            ctl.toggle_expand(&id(&c));
            ctl.wait_idle().await;

            let gate_a = gated.gate(&a);
            let gate_c = gated.gate(&c);
            ctl.refresh();
            // Both restorations are committed as placeholders and parked on their gates.
            let (a2, c2) = (a.clone(), c.clone());
            wait_until(&ctl, move |s| is_placeholder(s, &a2) && is_placeholder(s, &c2)).await;

            let (first, first_path, second) = if b_first {
                (gate_c, c.clone(), gate_a)
            } else {
                (gate_a, a.clone(), gate_c)
            };
            first.send(()).unwrap();
            wait_until(&ctl, move |s| {
                find_node(&s.nodes, &id(&first_path))
                    .and_then(|n| n.children().as_loaded().map(|c| !c.is_empty()))
                    .unwrap_or(false)
            })
            .await;
            second.send(()).unwrap();
            ctl.wait_idle().await;

            assert_eq!(child_names(&ctl, &a), Some(vec!["b".into(), "inner.txt".into()]));
            assert_eq!(child_names(&ctl, &c), Some(vec!["one.rs".into()]));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stale_root_load_does_not_clobber_newer_root() {
        let old_root = setup_test_dir();
        let new_root = setup_test_dir();
        File::create(new_root.path().join("only_new.txt")).unwrap();

        let gated = Arc::new(GatedScanner::default());
        let ctl = TreeController::new(gated.clone(), false).unwrap();
        let release_old = gated.gate(old_root.path());

        ctl.load_directory(old_root.path());
        ctl.load_directory(new_root.path());
        wait_until(&ctl, |s| s.nodes.iter().any(|n| n.name == "only_new.txt")).await;

        release_old.send(()).unwrap();
        ctl.wait_idle().await;

        let snap = ctl.snapshot();
        assert_eq!(snap.root_path.as_deref(), Some(new_root.path()));
        assert!(snap.nodes.iter().any(|n| n.name == "only_new.txt"));
        assert!(snap
            .nodes
            .iter()
            .all(|n| n.path.starts_with(new_root.path())));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn child_scan_for_old_root_is_dropped() {
        let old_root = setup_test_dir();
        let new_root = TempDir::new().unwrap();
        File::create(new_root.path().join("solo.txt")).unwrap();

        let gated = Arc::new(GatedScanner::default());
        let ctl = loaded(gated.clone(), old_root.path()).await;
        let a = old_root.path().join("a");
        let release = gated.gate(&a);
        ctl.toggle_expand(&id(&a));

        ctl.load_directory(new_root.path());
        wait_until(&ctl, |s| s.nodes.iter().any(|n| n.name == "solo.txt")).await;
        release.send(()).unwrap();
        ctl.wait_idle().await;

        assert_eq!(names(&ctl.snapshot().nodes), vec!["solo.txt"]);
    }

    #[tokio::test]
    async fn toggle_hidden_files_rescans_and_keeps_expansion() {
        let dir = setup_test_dir();
        File::create(dir.path().join("a").join(".secret")).unwrap();
        let ctl = loaded(Arc::new(FsScanner), dir.path()).await;
        let a = dir.path().join("a");
        ctl.toggle_expand(&id(&a));
        ctl.wait_idle().await;
        assert_eq!(child_names(&ctl, &a).map(|c| c.len()), Some(2));

        ctl.toggle_hidden_files();
        ctl.wait_idle().await;
        let snap = ctl.snapshot();
        assert!(snap.show_hidden);
        assert_eq!(names(&snap.nodes), vec!["a", "c", ".hidden", "root.md"]);
        assert_eq!(
            child_names(&ctl, &a),
            Some(vec!["b".into(), ".secret".into(), "inner.txt".into()])
        );

        ctl.toggle_hidden_files();
        ctl.wait_idle().await;
        assert_eq!(names(&ctl.snapshot().nodes), vec!["a", "c", "root.md"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restoration_from_superseded_refresh_is_dropped() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        fs::create_dir(&a).unwrap();
        File::create(a.join(".secret")).unwrap();
        File::create(a.join("x.txt")).unwrap();

        let (holding, mut entered) = HoldingScanner::new(&a);
        let holding = Arc::new(holding);
        let ctl = loaded(holding.clone(), dir.path()).await;
        ctl.toggle_expand(&id(&a));
        next_entry(&mut entered).await;
        ctl.wait_idle().await;
        assert_eq!(child_names(&ctl, &a), Some(vec!["x.txt".into()]));

        // The restoration scheduled by the first toggle lists `a` with hidden
        // files shown, and stays parked until released.
        let release_old = holding.gate();
        ctl.toggle_hidden_files();
        next_entry(&mut entered).await;

        ctl.toggle_hidden_files();
        next_entry(&mut entered).await;
        let a2 = a.clone();
        wait_until(&ctl, move |s| {
            find_node(&s.nodes, &id(&a2))
                .and_then(|n| n.children().as_loaded().map(|c| c.len() == 1))
                .unwrap_or(false)
        })
        .await;

        release_old.send(()).unwrap();
        ctl.wait_idle().await;

        assert!(!ctl.snapshot().show_hidden);
        assert_eq!(child_names(&ctl, &a), Some(vec!["x.txt".into()]));
    }

    #[tokio::test]
    async fn expanded_dir_emptied_between_scans_becomes_empty() {
        let dir = setup_test_dir();
        let ctl = loaded(Arc::new(FsScanner), dir.path()).await;
        let c = dir.path().join("c");
        ctl.toggle_expand(&id(&c));
        ctl.wait_idle().await;

        fs::remove_file(c.join("one.rs")).unwrap();
        ctl.refresh();
        ctl.wait_idle().await;

        let node = ctl.store().find(&id(&c)).unwrap();
        assert!(node.is_expanded());
        assert_eq!(node.children(), &Children::Loaded(Vec::new()));
    }

    #[tokio::test]
    async fn ids_are_unique_across_expanded_tree() {
        let dir = setup_test_dir();
        let ctl = loaded(Arc::new(FsScanner), dir.path()).await;
        for path in [dir.path().join("a"), dir.path().join("a").join("b"), dir.path().join("c")] {
            ctl.toggle_expand(&id(&path));
            ctl.wait_idle().await;
        }

        let items = crate::fs::tree::flatten(&ctl.snapshot().nodes);
        let unique: std::collections::HashSet<_> = items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(unique.len(), items.len());
        assert_eq!(items.len(), 7);
    }
}
