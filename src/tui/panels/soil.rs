use crate::sim::soil::SENSOR_MODEL;
use crate::tui::app::App;
use crate::tui::widgets::panel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};

pub fn render_soil_panel(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let soil = &app.soil;
    let reading = soil.reading;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Min(0),
        ])
        .split(area);

    let moisture = Gauge::default()
        .block(panel("Moisture", &palette))
        .gauge_style(Style::default().fg(palette.accent))
        .ratio((reading.moisture / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.1}%", reading.moisture));
    frame.render_widget(moisture, rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2); 2])
        .split(rows[1]);

    let value = |v: String| {
        Line::from(Span::styled(
            v,
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        ))
    };
    frame.render_widget(
        Paragraph::new(value(format!("{:.1}°C", reading.temperature)))
            .block(panel("Temperature", &palette)),
        cols[0],
    );
    frame.render_widget(
        Paragraph::new(value(format!("{:.2}", reading.ph))).block(panel("pH Level", &palette)),
        cols[1],
    );

    let info = vec![
        Line::from(vec![
            Span::styled("Sensor: ", palette.dim()),
            Span::styled(SENSOR_MODEL, palette.text()),
        ]),
        Line::from(vec![
            Span::styled("Update interval: ", palette.dim()),
            Span::styled(
                format!("{}s", soil.jitter.period().as_secs_f64()),
                palette.text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Status: ", palette.dim()),
            if soil.jitter.is_running() {
                Span::styled("Live", Style::default().fg(palette.good))
            } else {
                Span::styled("Paused", palette.dim())
            },
        ]),
        Line::from(vec![
            Span::styled("Readings taken: ", palette.dim()),
            Span::styled(soil.ticks.to_string(), palette.text()),
        ]),
        Line::from(Span::styled("Simulated sensor, no backend", palette.dim())),
    ];
    frame.render_widget(
        Paragraph::new(info).block(panel("Sensor Info", &palette)),
        rows[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgribotConfig;
    use crate::tui::app::Page;
    use crate::tui::test_utils::{render, text};
    use std::time::Instant;

    #[test]
    fn shows_seed_reading_and_sensor_box() {
        let app = App::new(
            AgribotConfig::default(),
            None,
            Some(Page::SoilSensor),
            Instant::now(),
        );
        let out = text(&render(80, 20, |f| {
            let area = f.size();
            render_soil_panel(f, &app, area)
        }));
        assert!(out.contains("32.5%"));
        assert!(out.contains("24.3°C"));
        assert!(out.contains("6.80"));
        assert!(out.contains(SENSOR_MODEL));
        assert!(out.contains("5s"));
        assert!(out.contains("Status: Live"));
    }

    #[test]
    fn stopped_sensor_reads_paused() {
        let mut app = App::new(
            AgribotConfig::default(),
            None,
            Some(Page::SoilSensor),
            Instant::now(),
        );
        app.soil.jitter.cancel();
        let out = text(&render(80, 20, |f| {
            let area = f.size();
            render_soil_panel(f, &app, area)
        }));
        assert!(out.contains("Status: Paused"));
    }
}
