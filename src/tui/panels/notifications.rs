use crate::models::NotificationKind;
use crate::tui::app::App;
use crate::tui::state::notifications;
use crate::tui::theme::Palette;
use crate::tui::widgets::panel;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn marker(kind: NotificationKind, palette: &Palette) -> (&'static str, Color) {
    match kind {
        NotificationKind::Warning => ("!", palette.warn),
        NotificationKind::Success => ("✓", palette.good),
        NotificationKind::Info => ("i", palette.accent),
        NotificationKind::Schedule => ("◷", Color::Magenta),
    }
}

pub fn render_notifications_panel(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();

    let items: Vec<ListItem> = notifications()
        .into_iter()
        .map(|n| {
            let (icon, color) = marker(n.kind, &palette);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {} ", icon), Style::default().fg(color)),
                    Span::styled(n.title, palette.text().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  {}", n.time), palette.dim()),
                ]),
                Line::from(Span::styled(format!("   {}", n.message), palette.text())),
                Line::from(""),
            ])
        })
        .collect();

    frame.render_widget(List::new(items).block(panel("Notifications", &palette)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgribotConfig;
    use crate::tui::app::Page;
    use crate::tui::test_utils::{render, text};
    use std::time::Instant;

    #[test]
    fn lists_every_notification() {
        let app = App::new(
            AgribotConfig::default(),
            None,
            Some(Page::Notifications),
            Instant::now(),
        );
        let out = text(&render(110, 30, |f| {
            let area = f.size();
            render_notifications_panel(f, &app, area)
        }));
        for n in notifications() {
            assert!(out.contains(n.title));
        }
    }
}
