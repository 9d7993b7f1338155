use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::App;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    // Update scroll offset to keep selected item visible
    let visible_height = chunks[0].height.saturating_sub(2) as usize; // account for border
    app.update_scroll(visible_height);

    let block = Block::default()
        .title(format!(" {} ", app.root_name()))
        .borders(Borders::ALL);
    let tree_widget = TreeWidget::new(&app.flat_items, app.selected_index, app.scroll_offset)
        .use_icons(app.use_icons)
        .block(block);
    frame.render_widget(tree_widget, chunks[0]);

    let root = app.root_display();
    let mut status = StatusBarWidget::new(&root, app.snapshot.show_hidden);
    if let Some((msg, _)) = &app.status_message {
        status = status.status_message(msg);
    }
    frame.render_widget(status, chunks[1]);
}
