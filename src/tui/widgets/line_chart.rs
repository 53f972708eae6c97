use crate::models::ChartPoint;
use crate::tui::state::Period;
use crate::tui::theme::Palette;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

/// Chart series extracted from a mixed list of points. Labeled points feed
/// the primary series; `{month, desktop, mobile}` points feed both.
#[derive(Debug, Default, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub primary: Vec<(f64, f64)>,
    pub secondary: Vec<(f64, f64)>,
}

pub fn series(points: &[ChartPoint]) -> Series {
    let mut out = Series::default();
    for (i, point) in points.iter().enumerate() {
        let x = i as f64;
        out.labels.push(point.label().to_string());
        match point {
            ChartPoint::Labeled { value, .. } => out.primary.push((x, *value)),
            ChartPoint::Series {
                desktop, mobile, ..
            } => {
                out.primary.push((x, *desktop));
                out.secondary.push((x, *mobile));
            }
        }
    }
    out
}

fn y_max(s: &Series) -> f64 {
    let top = s
        .primary
        .iter()
        .chain(s.secondary.iter())
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max);
    if top <= 0.0 {
        1.0
    } else {
        top * 1.1
    }
}

pub fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    points: &[ChartPoint],
    period: Period,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(Span::styled(format!(" Overview · {} ", period.label()), palette.title()));

    if points.is_empty() {
        let empty = Paragraph::new("No chart data")
            .style(palette.dim())
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let s = series(points);
    let top = y_max(&s);

    let mut datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(palette.accent))
        .data(&s.primary)];
    if !s.secondary.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Magenta))
                .data(&s.secondary),
        );
    }

    let x_labels: Vec<Span> = match (s.labels.first(), s.labels.last()) {
        (Some(first), Some(last)) if s.labels.len() > 1 => {
            vec![Span::raw(first.clone()), Span::raw(last.clone())]
        }
        (Some(only), _) => vec![Span::raw(only.clone())],
        _ => Vec::new(),
    };

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(palette.dim())
                .bounds([0.0, (s.labels.len().saturating_sub(1)).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(palette.dim())
                .bounds([0.0, top])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", top / 2.0)),
                    Span::raw(format!("{:.0}", top)),
                ]),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_shapes_split_into_series() {
        let points = vec![
            ChartPoint::Labeled {
                label: "AGR-001".into(),
                value: 85.0,
            },
            ChartPoint::Series {
                month: "Feb".into(),
                desktop: 300.0,
                mobile: 200.0,
            },
        ];
        let s = series(&points);
        assert_eq!(s.labels, vec!["AGR-001", "Feb"]);
        assert_eq!(s.primary, vec![(0.0, 85.0), (1.0, 300.0)]);
        assert_eq!(s.secondary, vec![(1.0, 200.0)]);
        assert!(y_max(&s) > 300.0);
    }

    #[test]
    fn empty_series_has_positive_range() {
        assert_eq!(y_max(&Series::default()), 1.0);
    }
}
