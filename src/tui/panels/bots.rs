use crate::models::{format_percent, BotLocation, BotStatus, CropType, FieldData};
use crate::sim::bots::{fleet_counts, USER_LOCATION_ID};
use crate::sim::fields::{
    crop_color, field_quad, fields_summary, format_field_info, health_grade, quad_center,
    HealthGrade,
};
use crate::tui::app::App;
use crate::tui::state::{BotMapState, Marker, Selection};
use crate::tui::theme::Palette;
use crate::tui::widgets::{panel, render_error_banner};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::canvas::{Canvas, Line as CanvasLine},
    widgets::{List, ListItem, Paragraph, Wrap},
    Frame,
};

fn status_color(status: BotStatus, palette: &Palette) -> Color {
    match status {
        BotStatus::Active => palette.good,
        BotStatus::Charging => palette.warn,
        BotStatus::Maintenance => palette.bad,
    }
}

fn grade_color(value: u8, palette: &Palette) -> Color {
    match health_grade(value) {
        HealthGrade::Good => palette.good,
        HealthGrade::Fair => palette.warn,
        HealthGrade::Poor => palette.bad,
    }
}

/// Canvas y runs bottom-up; layout positions run top-down.
fn flip(y: f64) -> f64 {
    100.0 - y
}

fn render_map(frame: &mut Frame, map: &BotMapState, area: Rect, palette: &Palette) {
    let selected = map.selection.clone();
    let canvas = Canvas::default()
        .block(panel("Field Map", palette))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(move |ctx| {
            for (i, field) in map.fields.iter().enumerate() {
                let quad = field_quad(i);
                let (r, g, b) = crop_color(field.crop_type, field.ndvi_value);
                let color = Color::Rgb(r, g, b);
                for k in 0..quad.len() {
                    let (x1, y1) = quad[k];
                    let (x2, y2) = quad[(k + 1) % quad.len()];
                    ctx.draw(&CanvasLine {
                        x1,
                        y1: flip(y1),
                        x2,
                        y2: flip(y2),
                        color,
                    });
                }
                let (cx, cy) = quad_center(&quad);
                let mut style = Style::default().fg(color);
                if selected == Some(Selection::Field(field.id.clone())) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                ctx.print(cx - 4.0, flip(cy), Span::styled(field.name.clone(), style));
            }
            ctx.layer();

            for (i, bot) in map.bots.iter().enumerate() {
                let (x, y) = map.bot_position(i);
                let (glyph, label, color) = if bot.id == USER_LOCATION_ID {
                    ("◎", "You".to_string(), palette.accent)
                } else {
                    ("●", bot.id.clone(), status_color(bot.status, palette))
                };
                let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
                if selected == Some(Selection::Bot(bot.id.clone())) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                ctx.print(x, flip(y), Span::styled(format!("{} {}", glyph, label), style));
            }
        });
    frame.render_widget(canvas, area);
}

fn marker_line(map: &BotMapState, marker: Marker, palette: &Palette) -> Line<'static> {
    match marker {
        Marker::Bot(i) => {
            let bot = &map.bots[i];
            Line::from(vec![
                Span::styled("● ", Style::default().fg(status_color(bot.status, palette))),
                Span::styled(bot.name.clone(), palette.text()),
                Span::styled(format!("  {}", format_percent(bot.battery)), palette.dim()),
            ])
        }
        Marker::Field(i) => {
            let field = &map.fields[i];
            Line::from(vec![
                Span::styled("▱ ", Style::default().fg(grade_color(field.soil_health, palette))),
                Span::styled(field.name.clone(), palette.text()),
                Span::styled(format!("  {}", field.crop_type), palette.dim()),
            ])
        }
    }
}

fn bot_detail(bot: &BotLocation) -> Vec<String> {
    vec![
        format!("{} ({})", bot.name, bot.id),
        format!("Status: {}", bot.status),
        format!("Battery: {}", format_percent(bot.battery)),
        format!("Task: {}", bot.task),
        format!("Speed: {}", bot.speed),
        format!("Position: {:.4}, {:.4}", bot.lat, bot.lng),
        format!("Updated: {}", bot.last_update),
    ]
}

fn field_detail(field: &FieldData) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", field.name, field.crop_type)];
    lines.extend(format_field_info(field));
    lines.push(format!("Planted: {}", field.planting_date));
    lines.push(format!("Harvest: {}", field.expected_harvest));
    lines
}

fn legend_lines(map: &BotMapState, palette: &Palette) -> Vec<Line<'static>> {
    let dot = |glyph: &'static str, label: &'static str, color: Color| {
        vec![
            Span::styled(glyph, Style::default().fg(color)),
            Span::styled(label, palette.text()),
        ]
    };
    let crop = |crop: CropType, label: &'static str| {
        let (r, g, b) = crop_color(crop, 1.0);
        dot("▱ ", label, Color::Rgb(r, g, b))
    };

    let markers = [
        dot("◎ ", "You  ", palette.accent),
        dot("● ", "Active  ", palette.good),
        dot("● ", "Charging  ", palette.warn),
        dot("● ", "Maintenance", palette.bad),
    ];
    let crops = [
        crop(CropType::Corn, "Corn  "),
        crop(CropType::Wheat, "Wheat  "),
        crop(CropType::Soy, "Soybean"),
    ];
    let imagery = match &map.imagery {
        Some(imagery) => format!("Imagery {}: {}", imagery.date, imagery.chip()),
        None => "Imagery: waiting for location".to_string(),
    };

    vec![
        Line::from(markers.concat()),
        Line::from(crops.concat()),
        Line::from(Span::styled(fields_summary(&map.fields), palette.dim())),
        Line::from(Span::styled(imagery, palette.dim())),
    ]
}

pub fn render_bots_panel(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let map = &app.bots;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(if map.location_error.is_some() { 3 } else { 0 }),
            Constraint::Min(0),
        ])
        .split(area);

    let counts = fleet_counts(&map.bots);
    let locating = if map.locating { "  locating…" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Bot Location ", palette.title()),
            Span::styled(format!("Active {}", counts.active), Style::default().fg(palette.good)),
            Span::raw("  "),
            Span::styled(format!("Charging {}", counts.charging), Style::default().fg(palette.warn)),
            Span::raw("  "),
            Span::styled(
                format!("Maintenance {}", counts.maintenance),
                Style::default().fg(palette.bad),
            ),
            Span::raw("  "),
            Span::styled(format!("Total {}", counts.total), palette.text()),
            Span::styled(locating, palette.dim()),
        ])),
        rows[0],
    );

    if let Some(error) = &map.location_error {
        render_error_banner(frame, rows[1], &format!("{}  [l] Try again", error), &palette);
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[2]);

    render_map(frame, map, cols[0], &palette);

    let detail = map
        .selected_bot()
        .map(bot_detail)
        .or_else(|| map.selected_field().map(field_detail));

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(6),
            Constraint::Length(if detail.is_some() { 11 } else { 0 }),
        ])
        .split(cols[1]);

    let items: Vec<ListItem> = map
        .markers()
        .into_iter()
        .enumerate()
        .map(|(i, marker)| {
            let item = ListItem::new(marker_line(map, marker, &palette));
            if i == map.cursor {
                item.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                item
            }
        })
        .collect();
    frame.render_widget(List::new(items).block(panel("Markers", &palette)), side[0]);

    let legend_title = if map.fields_loading() {
        "Legend  Updating…"
    } else {
        "Legend  [f] Refresh Fields"
    };
    frame.render_widget(
        Paragraph::new(legend_lines(map, &palette)).block(panel(legend_title, &palette)),
        side[1],
    );

    if let Some(lines) = detail {
        let text: Vec<Line> = lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, palette.text())))
            .collect();
        frame.render_widget(
            Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(panel("Details  [Esc] close", &palette)),
            side[2],
        );
    }
}
