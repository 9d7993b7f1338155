use std::path::Path;
use std::time::{Duration, Instant};

use lazytree::fs::controller::TreeController;
use lazytree::fs::store::TreeSnapshot;
use lazytree::fs::tree::{self, FlatItem, NodeId, NodeKind};

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Main application state.
///
/// The tree itself lives in the controller; the app holds the last snapshot
/// it rendered plus cursor state keyed to it.
pub struct App {
    pub controller: TreeController,
    pub snapshot: TreeSnapshot,
    pub flat_items: Vec<FlatItem>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub should_quit: bool,
    pub use_icons: bool,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(controller: TreeController, use_icons: bool) -> Self {
        let snapshot = controller.snapshot();
        let flat_items = tree::flatten(&snapshot.nodes);
        Self {
            controller,
            snapshot,
            flat_items,
            selected_index: 0,
            scroll_offset: 0,
            should_quit: false,
            use_icons,
            status_message: None,
        }
    }

    /// Adopt a newer snapshot, keeping the cursor on the same node if it is
    /// still visible.
    pub fn sync_snapshot(&mut self, snapshot: TreeSnapshot) {
        let selected_id = self.selected_item().map(|item| item.id.clone());
        self.flat_items = tree::flatten(&snapshot.nodes);
        self.snapshot = snapshot;

        let position = selected_id
            .and_then(|id| self.flat_items.iter().position(|item| item.id == id));
        self.selected_index = match position {
            Some(index) => index,
            None => self
                .selected_index
                .min(self.flat_items.len().saturating_sub(1)),
        };
    }

    /// Pull the controller's current snapshot.
    pub fn sync_from_controller(&mut self) {
        let snapshot = self.controller.snapshot();
        self.sync_snapshot(snapshot);
    }

    pub fn selected_item(&self) -> Option<&FlatItem> {
        self.flat_items.get(self.selected_index)
    }

    pub fn root_display(&self) -> String {
        self.snapshot
            .root_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// Root directory name for the tree block title.
    pub fn root_name(&self) -> String {
        self.snapshot
            .root_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.root_display())
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed() > STATUS_TTL {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let len = self.flat_items.len();
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        let len = self.flat_items.len();
        if len > 0 {
            self.selected_index = len - 1;
        }
    }

    /// Expand or collapse the selected directory; no-op on files.
    pub fn toggle_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        if item.kind != NodeKind::Directory {
            return;
        }
        let id = item.id.clone();
        self.controller.toggle_expand(&id);
        self.sync_from_controller();
    }

    /// Collapse the selected directory, or jump to parent if on a file or
    /// collapsed directory.
    pub fn collapse_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        if item.kind == NodeKind::Directory && item.is_expanded {
            let id = item.id.clone();
            self.controller.toggle_expand(&id);
            self.sync_from_controller();
            return;
        }
        let Some(parent) = item.path.parent().map(NodeId::from) else {
            return;
        };
        if let Some(index) = self.flat_items.iter().position(|i| i.id == parent) {
            self.selected_index = index;
        }
    }

    /// Rescan from the root, keeping expanded directories expanded.
    pub fn refresh(&mut self) {
        self.controller.refresh();
        self.set_status_message(format!("Refreshing {}", self.root_display()));
    }

    /// Toggle hidden file visibility.
    pub fn toggle_hidden(&mut self) {
        self.controller.toggle_hidden_files();
        self.sync_from_controller();
        let msg = if self.snapshot.show_hidden {
            "Showing hidden files"
        } else {
            "Hiding hidden files"
        };
        self.set_status_message(msg.to_string());
    }

    /// Keep the selected row inside a viewport of `visible_height` rows.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }
}
