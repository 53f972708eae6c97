use crate::detect::{Outcome, MAX_IMAGE_BYTES};
use crate::tui::app::App;
use crate::tui::theme::Palette;
use crate::tui::widgets::panel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

fn outcome_lines(outcome: &Outcome, palette: &Palette) -> Vec<Line<'static>> {
    let headline = |color: Color| {
        Line::from(Span::styled(
            outcome.headline(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    };
    match outcome {
        Outcome::Threat {
            animal,
            confidence,
            message,
        } => {
            let mut lines = vec![
                headline(palette.bad),
                Line::from(format!("Animal: {}", animal)),
            ];
            if let Some(c) = confidence {
                lines.push(Line::from(format!("Confidence: {}", c)));
            }
            if !message.is_empty() {
                lines.push(Line::from(message.clone()));
            }
            lines
        }
        Outcome::Clear { message } => vec![headline(palette.good), Line::from(message.clone())],
        Outcome::Failed { message } => vec![headline(palette.bad), Line::from(message.clone())],
    }
}

pub fn render_detection_panel(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let det = &app.detection;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let mut upload = Vec::new();
    match (&det.prompt, &det.image) {
        (Some(typed), _) => {
            upload.push(Line::from(Span::styled("Image path:", palette.dim())));
            upload.push(Line::from(vec![
                Span::styled(typed.clone(), palette.text()),
                Span::styled("▏", Style::default().fg(palette.accent)),
            ]));
        }
        (None, Some(image)) => {
            upload.push(Line::from(vec![
                Span::styled("Loaded: ", palette.dim()),
                Span::styled(image.path.display().to_string(), palette.text()),
            ]));
            upload.push(Line::from(Span::styled(
                "[d] Detect Animals  [i] Choose another  [x] Reset",
                palette.dim(),
            )));
        }
        (None, None) => {
            upload.push(Line::from(Span::styled(
                format!(
                    "[i] Choose an image (PNG, JPG, GIF up to {}MB)",
                    MAX_IMAGE_BYTES / (1024 * 1024)
                ),
                palette.dim(),
            )));
        }
    }
    if let Some(error) = &det.load_error {
        upload.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(palette.bad),
        )));
    }
    frame.render_widget(
        Paragraph::new(upload)
            .wrap(Wrap { trim: true })
            .block(panel("Upload Image", &palette)),
        rows[0],
    );

    let result: Vec<Line> = if det.detecting {
        vec![Line::from(Span::styled("Analyzing…", palette.title()))]
    } else if let Some(outcome) = &det.outcome {
        outcome_lines(outcome, &palette)
    } else {
        vec![Line::from(Span::styled(
            "Upload an image to check for animal threats",
            palette.dim(),
        ))]
    };
    frame.render_widget(
        Paragraph::new(result)
            .wrap(Wrap { trim: true })
            .block(panel("Detection Result", &palette)),
        rows[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgribotConfig;
    use crate::models::DetectionResult;
    use crate::tui::app::Page;
    use crate::tui::test_utils::{render, text};
    use std::path::PathBuf;
    use std::time::Instant;

    fn draw(app: &App) -> String {
        text(&render(100, 20, |f| {
            let area = f.size();
            render_detection_panel(f, app, area)
        }))
    }

    #[test]
    fn threat_result_shows_animal_and_confidence() {
        let mut app = App::new(
            AgribotConfig::default(),
            None,
            Some(Page::AnimalDetection),
            Instant::now(),
        );
        app.detection
            .load_image(PathBuf::from("pasture.jpg"), "data:image/jpeg;base64,AA".into());
        app.detection.begin_detect();
        assert!(draw(&app).contains("Analyzing"));

        app.detection.finish(Ok(DetectionResult {
            success: true,
            threat_detected: true,
            animal_type: Some("cow".into()),
            confidence: Some(92.0),
            ..DetectionResult::default()
        }));

        let out = draw(&app);
        assert!(out.contains("Threat Detected!"));
        assert!(out.contains("cow"));
        assert!(out.contains("92%"));
    }

    #[test]
    fn empty_page_invites_upload() {
        let app = App::new(
            AgribotConfig::default(),
            None,
            Some(Page::AnimalDetection),
            Instant::now(),
        );
        let out = draw(&app);
        assert!(out.contains("up to 10MB"));
        assert!(!out.contains("Threat Detected!"));
    }
}
