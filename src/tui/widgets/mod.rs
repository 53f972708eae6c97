pub mod line_chart;
pub mod metric_card;

use crate::tui::theme::Palette;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// One-line error strip shown above a page's content.
pub fn render_error_banner(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let banner = Paragraph::new(message.to_string())
        .style(Style::default().fg(palette.bad).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.bad)),
        );
    frame.render_widget(banner, area);
}

/// Panel frame used by every page.
pub fn panel<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(ratatui::text::Span::styled(format!(" {} ", title), palette.title()))
}
