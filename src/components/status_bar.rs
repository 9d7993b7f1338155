use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

const KEY_HINTS: &str = " l:open  h:back  r:refresh  .:hidden  q:quit ";

/// One-line status bar: root path, hidden-file state and key hints, or a
/// transient message in their place.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    show_hidden: bool,
    status_message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, show_hidden: bool) -> Self {
        Self {
            path_str,
            show_hidden,
            status_message: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str) -> Self {
        self.status_message = Some(msg);
        self
    }
}

/// Keep the last `budget` characters, marking the cut with `...`.
fn truncate_left(s: &str, budget: usize) -> String {
    let len = s.chars().count();
    if len <= budget {
        return s.to_string();
    }
    if budget <= 3 {
        return s.chars().take(budget).collect();
    }
    let tail: String = s.chars().skip(len - (budget - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let display: String = msg.chars().take(width).collect();
            let line = Line::from(Span::styled(
                format!("{:<width$}", display, width = width),
                Style::default().fg(Color::Green),
            ));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let hidden = if self.show_hidden {
            " hidden:shown "
        } else {
            " hidden:off "
        };
        let remaining = width
            .saturating_sub(KEY_HINTS.len())
            .saturating_sub(hidden.len());
        let path_display = truncate_left(self.path_str, remaining);
        let pad = remaining.saturating_sub(path_display.chars().count());

        let line = Line::from(vec![
            Span::styled(path_display, Style::default().fg(Color::White)),
            Span::raw(" ".repeat(pad)),
            Span::styled(hidden, Style::default().fg(Color::Yellow)),
            Span::styled(
                KEY_HINTS,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            ),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
