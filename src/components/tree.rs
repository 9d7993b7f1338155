use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use lazytree::fs::tree::{FlatItem, NodeKind};

/// Coarse category used to pick a row's icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Folder,
    OpenFolder,
    Source,
    Data,
    Text,
    Shell,
    Web,
    Image,
    Generic,
}

impl FileCategory {
    pub fn of(name: &str, is_dir: bool, is_expanded: bool) -> Self {
        if is_dir {
            return if is_expanded {
                FileCategory::OpenFolder
            } else {
                FileCategory::Folder
            };
        }
        let ext = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
            _ => return FileCategory::Generic,
        };
        match ext.as_str() {
            "rs" | "swift" | "py" | "go" | "c" | "h" | "cpp" | "hpp" | "java" | "kt" | "rb" => {
                FileCategory::Source
            }
            "json" | "yaml" | "yml" | "toml" => FileCategory::Data,
            "md" | "txt" | "rst" => FileCategory::Text,
            "sh" | "zsh" | "bash" => FileCategory::Shell,
            "html" | "css" | "js" | "ts" | "tsx" | "jsx" => FileCategory::Web,
            "png" | "jpg" | "jpeg" | "gif" | "svg" => FileCategory::Image,
            _ => FileCategory::Generic,
        }
    }

    /// Nerd Font glyph, trailing space included.
    pub fn glyph(self) -> &'static str {
        match self {
            FileCategory::Folder => "\u{f07b} ",
            FileCategory::OpenFolder => "\u{f07c} ",
            FileCategory::Source => "\u{f121} ",
            FileCategory::Data => "\u{e60b} ",
            FileCategory::Text => "\u{f15c} ",
            FileCategory::Shell => "\u{f489} ",
            FileCategory::Web => "\u{f484} ",
            FileCategory::Image => "\u{f1c5} ",
            FileCategory::Generic => "\u{f15b} ",
        }
    }

    /// Plain-terminal fallback for `glyph`.
    pub fn ascii_tag(self) -> &'static str {
        match self {
            FileCategory::Folder => "[+] ",
            FileCategory::OpenFolder => "[-] ",
            FileCategory::Source => "[S] ",
            FileCategory::Data => "[D] ",
            FileCategory::Text => "[T] ",
            FileCategory::Shell => "[$] ",
            FileCategory::Web => "[W] ",
            FileCategory::Image => "[I] ",
            FileCategory::Generic => "[F] ",
        }
    }
}

/// Tree widget that renders the file tree with box-drawing characters.
pub struct TreeWidget<'a> {
    items: &'a [FlatItem],
    selected: usize,
    scroll_offset: usize,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(items: &'a [FlatItem], selected: usize, scroll_offset: usize) -> Self {
        Self {
            items,
            selected,
            scroll_offset,
            use_icons: true,
            block: None,
        }
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Build the indentation prefix for the row at `item_index`.
    ///
    /// Continuation bars depend on whether each ancestor is a last sibling,
    /// found by walking back to the nearest row at that depth.
    fn build_prefix(items: &[FlatItem], item_index: usize) -> String {
        let item = &items[item_index];
        let mut prefix = String::new();

        for d in 0..item.depth {
            let mut ancestor_is_last = false;
            for j in (0..item_index).rev() {
                if items[j].depth == d {
                    ancestor_is_last = items[j].is_last_sibling;
                    break;
                }
                if items[j].depth < d {
                    break;
                }
            }
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }

        prefix.push_str(if item.is_last_sibling { "└─ " } else { "├─ " });
        prefix
    }

    fn indicator(&self, item: &FlatItem) -> &'static str {
        let category = FileCategory::of(
            &item.name,
            item.kind == NodeKind::Directory,
            item.is_expanded,
        );
        if self.use_icons {
            category.glyph()
        } else {
            category.ascii_tag()
        }
    }

    fn row_style(item: &FlatItem, is_selected: bool) -> Style {
        if is_selected {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if item.is_hidden {
            Style::default().fg(Color::DarkGray)
        } else {
            match item.kind {
                NodeKind::Directory => Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                NodeKind::File => Style::default().fg(Color::Reset),
            }
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let visible_height = inner_area.height as usize;
        if visible_height == 0 {
            return;
        }

        if self.items.is_empty() {
            let line = Line::from(Span::styled(
                "Empty directory",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
            return;
        }

        let visible = self
            .items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible_height);

        for (row, (idx, item)) in visible.enumerate() {
            let y = inner_area.y + row as u16;
            let prefix = Self::build_prefix(self.items, idx);
            let content = format!("{}{}{}", prefix, self.indicator(item), item.name);
            let line = Line::from(Span::styled(
                content,
                Self::row_style(item, idx == self.selected),
            ));
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
