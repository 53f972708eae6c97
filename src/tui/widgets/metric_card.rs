use crate::tui::state::{CardTone, MetricCardData, Trend};
use crate::tui::theme::Palette;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const TREND_UP: &str = "▲";
pub const TREND_DOWN: &str = "▼";

fn tone_color(tone: CardTone) -> Color {
    match tone {
        CardTone::Blue => Color::Blue,
        CardTone::Cyan => Color::Cyan,
        CardTone::Amber => Color::Yellow,
        CardTone::Rose => Color::Magenta,
    }
}

pub fn render_metric_card(frame: &mut Frame, area: Rect, card: &MetricCardData, palette: &Palette) {
    let (arrow, arrow_color) = match card.trend {
        Trend::Up => (TREND_UP, palette.good),
        Trend::Down => (TREND_DOWN, palette.bad),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tone_color(card.tone)));

    let lines = vec![
        Line::from(Span::styled(card.subtitle, palette.dim())),
        Line::from(Span::styled(
            card.title.clone(),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!("{} ", arrow), Style::default().fg(arrow_color)),
            Span::styled(card.change.clone(), palette.dim()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
