use crate::tui::app::App;
use crate::tui::widgets::{
    line_chart::render_line_chart, metric_card::render_metric_card, panel, render_error_banner,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// News entries shown under the chart.
pub const DASHBOARD_NEWS_LIMIT: usize = 5;

pub fn render_dashboard_panel(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let dash = &app.dashboard;

    let banner_height = if dash.error.is_some() { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(DASHBOARD_NEWS_LIMIT as u16 + 2),
        ])
        .split(area);

    if let Some(error) = &dash.error {
        render_error_banner(frame, rows[0], &format!("{}  [r] Retry", error), &palette);
    }

    let status = match (&dash.last_updated, dash.in_flight > 0) {
        (_, true) => "Refreshing…".to_string(),
        (Some(at), false) => format!("Last updated {}", at.format("%H:%M:%S")),
        (None, false) => "Waiting for first poll".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Dashboard ", palette.title()),
            Span::styled(status, palette.dim()),
        ])),
        rows[1],
    );

    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[2]);
    for (card, card_area) in dash.metric_cards().iter().zip(card_areas.iter()) {
        render_metric_card(frame, *card_area, card, &palette);
    }

    render_line_chart(frame, rows[3], &dash.chart_points(), dash.period, &palette);

    let news_block = panel("Agriculture News", &palette);
    if dash.news.is_empty() {
        frame.render_widget(
            Paragraph::new("No news available")
                .style(palette.dim())
                .block(news_block),
            rows[4],
        );
    } else {
        let items: Vec<ListItem> = dash
            .news
            .iter()
            .take(DASHBOARD_NEWS_LIMIT)
            .map(|a| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("• {}", a.title), palette.text()),
                    Span::styled(format!("  {}", a.source), palette.dim()),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(news_block), rows[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgribotConfig;
    use crate::models::{NewsArticle, Telemetry, TelemetrySummary};
    use crate::tui::app::Page;
    use crate::tui::test_utils::{render, text};
    use std::time::Instant;

    #[test]
    fn cards_show_values_and_missing_fields() {
        let mut app = App::new(AgribotConfig::default(), None, Some(Page::Dashboard), Instant::now());
        app.take_requests();
        app.dashboard.apply_telemetry(Ok(Telemetry::Summary(TelemetrySummary {
            soil_moisture: Some(65.0),
            temperature: Some(22.5),
            ..TelemetrySummary::default()
        })));
        app.dashboard.apply_news(Ok(vec![NewsArticle {
            title: "Rain boosts wheat outlook".into(),
            source: "Farm Daily".into(),
            ..NewsArticle::default()
        }]));

        let out = text(&render(120, 40, |f| {
            let area = f.size();
            render_dashboard_panel(f, &app, area)
        }));
        assert!(out.contains("65%"));
        assert!(out.contains("22.5°C"));
        assert!(out.contains("N/A"));
        assert!(out.contains("Rain boosts wheat outlook"));
        assert!(out.contains("Overview · Month"));
    }
}
