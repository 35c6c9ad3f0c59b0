use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::ViewMode;
use crate::ui::helpers::spinner;

/// Key hints for each screen.
fn shortcuts(mode: ViewMode, in_group: bool) -> &'static [(&'static str, &'static str)] {
    match mode {
        ViewMode::List if in_group => &[
            ("p", "pull"),
            ("P", "pull group"),
            ("r", "refresh"),
            ("a", "add"),
            ("x", "remove"),
            ("e", "rename"),
            ("/", "filter"),
            ("Esc", "back"),
            ("q", "quit"),
        ],
        ViewMode::List => &[
            ("p", "pull"),
            ("P", "pull batch"),
            ("A", "pull behind"),
            ("r", "refresh"),
            ("d", "detail"),
            ("f", "fav"),
            ("m", "move"),
            ("n", "group"),
            ("1/2/0", "filters"),
            ("/", "filter"),
            ("S", "settings"),
            ("q", "quit"),
        ],
        ViewMode::Detail => &[
            ("Tab", "pane"),
            ("Enter", "switch/run"),
            ("p", "track"),
            ("x/X", "delete"),
            ("r", "reload"),
            ("Esc", "back"),
        ],
        ViewMode::PullResults => &[
            ("↑/↓", "move"),
            ("Enter/→", "open"),
            ("←", "up"),
            ("a", "expand all"),
            ("Esc", "close"),
        ],
        ViewMode::Error => &[("↑/↓", "scroll"), ("Esc", "dismiss")],
        _ => &[("Enter", "select"), ("Esc", "cancel")],
    }
}

pub struct StatusBarWidget<'a> {
    message: &'a str,
    mode: ViewMode,
    in_group: bool,
    busy: Option<usize>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(message: &'a str, mode: ViewMode, in_group: bool) -> Self {
        Self {
            message,
            mode,
            in_group,
            busy: None,
        }
    }

    /// Show a spinner at the given animation frame.
    pub fn busy(mut self, frame: Option<usize>) -> Self {
        self.busy = frame;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let mut spans: Vec<Span> = Vec::new();

        if let Some(anim) = self.busy {
            spans.push(Span::styled(
                format!("{} ", spinner(anim)),
                Style::default().fg(Color::Yellow),
            ));
        }

        if !self.message.is_empty() {
            spans.push(Span::styled(
                self.message.to_string(),
                Style::default().fg(Color::Yellow),
            ));
            spans.push(Span::raw("  "));
        }

        for (i, (key, action)) in shortcuts(self.mode, self.in_group).iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                format!("[{}]", key),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                action.to_string(),
                Style::default().fg(Color::White),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

pub struct InputBarWidget<'a> {
    prompt: &'a str,
    input: &'a str,
}

impl<'a> InputBarWidget<'a> {
    pub fn new(prompt: &'a str, input: &'a str) -> Self {
        Self { prompt, input }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(self.prompt.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled(self.input.to_string(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::White)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
