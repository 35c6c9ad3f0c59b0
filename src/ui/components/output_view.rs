use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Which end of the text stays pinned when it doesn't fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Read from the first line; scroll moves down
    #[default]
    Top,
    /// Follow the latest line; scroll moves back up
    Bottom,
}

/// Scrollable block of plain tool output.
pub struct OutputViewWidget<'a> {
    title: &'a str,
    content: &'a str,
    scroll: usize,
    anchor: Anchor,
    border: Color,
}

impl<'a> OutputViewWidget<'a> {
    pub fn new(title: &'a str, content: &'a str) -> Self {
        Self {
            title,
            content,
            scroll: 0,
            anchor: Anchor::Top,
            border: Color::Cyan,
        }
    }

    pub fn with_scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn border(mut self, color: Color) -> Self {
        self.border = color;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;

        // Tabs render as a single cell in ratatui
        let processed = self
            .content
            .replace('\t', "    ")
            .replace("\r\n", "\n")
            .replace('\r', "");
        let lines: Vec<Line> = processed.lines().map(|l| Line::from(l.to_string())).collect();

        let start = visible_window(lines.len(), visible_height, self.scroll, self.anchor);
        let visible_lines: Vec<Line> = lines.into_iter().skip(start).take(visible_height).collect();

        let paragraph = Paragraph::new(visible_lines)
            .block(
                Block::default()
                    .title(format!(" {} ", self.title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.border)),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, area);
    }
}

/// First line to show for `total` lines in a `height`-line window.
pub fn visible_window(total: usize, height: usize, scroll: usize, anchor: Anchor) -> usize {
    let max_start = total.saturating_sub(height);
    match anchor {
        Anchor::Top => scroll.min(max_start),
        Anchor::Bottom => max_start.saturating_sub(scroll),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_anchor_clamps_scroll() {
        assert_eq!(visible_window(100, 10, 0, Anchor::Top), 0);
        assert_eq!(visible_window(100, 10, 500, Anchor::Top), 90);
        assert_eq!(visible_window(5, 10, 3, Anchor::Top), 0);
    }

    #[test]
    fn test_bottom_anchor_follows_tail() {
        assert_eq!(visible_window(100, 10, 0, Anchor::Bottom), 90);
        assert_eq!(visible_window(100, 10, 20, Anchor::Bottom), 70);
        assert_eq!(visible_window(100, 10, 500, Anchor::Bottom), 0);
    }
}
