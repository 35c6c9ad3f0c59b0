use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::helpers::{centered_rect, SELECTED_BG};

fn key_hints(pairs: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (i, (key, label)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[{}]", key),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}", label),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn modal_block(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

/// Yes/no question for a destructive action, answered with `y` or `n`/Esc.
pub struct ConfirmModal<'a> {
    title: &'a str,
    question: String,
    consequence: Option<&'a str>,
    verb: &'a str,
}

impl<'a> ConfirmModal<'a> {
    pub fn new(title: &'a str, question: impl Into<String>) -> Self {
        Self {
            title,
            question: question.into(),
            consequence: None,
            verb: "confirm",
        }
    }

    /// Dimmed second line saying what happens afterwards.
    pub fn consequence(mut self, text: &'a str) -> Self {
        self.consequence = Some(text);
        self
    }

    /// Label next to the `y` key.
    pub fn verb(mut self, verb: &'a str) -> Self {
        self.verb = verb;
        self
    }

    pub fn render(self, frame: &mut Frame) {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.question,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(text) = self.consequence {
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(""));
        lines.push(key_hints(&[("y", self.verb), ("n/Esc", "keep")]));

        let paragraph = Paragraph::new(lines)
            .block(modal_block(self.title, Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}

/// Single-line text entry: root directory or group name.
pub struct InputModal<'a> {
    title: &'a str,
    prompt: &'a str,
    input: &'a str,
    note: Option<&'a str>,
}

impl<'a> InputModal<'a> {
    pub fn new(title: &'a str, prompt: &'a str, input: &'a str) -> Self {
        Self {
            title,
            prompt,
            input,
            note: None,
        }
    }

    pub fn note(mut self, note: &'a str) -> Self {
        self.note = Some(note);
        self
    }

    pub fn render(self, frame: &mut Frame) {
        let area = centered_rect(60, 25, frame.area());
        frame.render_widget(Clear, area);
        let room = field_width(area);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.prompt, Style::default().fg(Color::White))),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    input_tail(self.input, room),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", Style::default().fg(Color::White)),
            ]),
        ];
        if let Some(note) = self.note {
            lines.push(Line::from(Span::styled(
                note,
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(""));
        lines.push(key_hints(&[("Enter", "apply"), ("Esc", "cancel")]));

        let paragraph = Paragraph::new(lines).block(modal_block(self.title, Color::Cyan));
        frame.render_widget(paragraph, area);
    }
}

/// Columns left for typed text after borders, the prompt marker and the cursor.
fn field_width(area: Rect) -> usize {
    area.width.saturating_sub(5) as usize
}

/// The end of `input` that fits in `room` columns; long paths keep their tail visible.
pub fn input_tail(input: &str, room: usize) -> String {
    let len = input.chars().count();
    if len <= room {
        return input.to_string();
    }
    if room == 0 {
        return String::new();
    }
    let keep = room - 1;
    let tail: String = input.chars().skip(len - keep).collect();
    format!("…{}", tail)
}

/// Render a single-choice menu with the selected entry highlighted.
pub fn render_menu_modal(
    frame: &mut Frame,
    title: &str,
    prompt: &str,
    items: &[String],
    selected: usize,
) {
    let percent = (items.len() + 6) * 100 / frame.area().height.max(1) as usize;
    let height = percent.clamp(20, 80) as u16;
    let area = centered_rect(50, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(prompt, Style::default().fg(Color::White))),
        Line::from(""),
    ];
    lines.extend(items.iter().enumerate().map(|(i, item)| {
        if i == selected {
            Line::from(vec![
                Span::styled(" ▶ ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    item.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
            .style(Style::default().bg(SELECTED_BG))
        } else {
            Line::from(vec![
                Span::raw("   "),
                Span::styled(item.clone(), Style::default().fg(Color::White)),
            ])
        }
    }));
    lines.push(Line::from(""));
    lines.push(key_hints(&[("↑/↓", "move"), ("Enter", "select"), ("Esc", "cancel")]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(paragraph, area);
}
