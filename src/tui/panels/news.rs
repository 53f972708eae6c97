use crate::tui::app::App;
use crate::tui::state::{filter_by_category, Categorized, Feed, NewsCard, NewsCategory};
use crate::tui::theme::Palette;
use crate::tui::widgets::{panel, render_error_banner};
use chrono::{DateTime, NaiveDateTime};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

pub const NO_IMAGE: &str = "No Image";
const DATE_FORMAT: &str = "%b %-d, %I:%M %p";

/// Formats a feed timestamp as `Mon D, HH:MM AM`. Unparseable input is
/// shown as-is.
pub fn format_news_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(DATE_FORMAT).to_string();
    }
    raw.to_string()
}

/// An image URL the terminal can at least link to.
pub fn usable_image(url: Option<&str>) -> Option<&str> {
    url.map(str::trim)
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
}

struct CardText<'a> {
    title: &'a str,
    source: &'a str,
    date: &'a str,
    description: &'a str,
    image: Option<&'a str>,
}

fn card_text<'a>(card: &NewsCard<'a>) -> CardText<'a> {
    match *card {
        NewsCard::Agri(a) => CardText {
            title: &a.title,
            source: &a.source,
            date: &a.published_at,
            description: &a.description,
            image: a.image.as_deref(),
        },
        NewsCard::Weather(w) => CardText {
            title: &w.title,
            source: "Weather",
            date: &w.pub_date,
            description: w.description.as_deref().unwrap_or(""),
            image: w.image_url.as_deref(),
        },
    }
}

fn card_item<'a>(card: &NewsCard<'a>, palette: &Palette) -> ListItem<'a> {
    let text = card_text(card);
    let tag = match card.category() {
        NewsCategory::Agriculture => "[Agriculture]",
        NewsCategory::Weather => "[Weather]",
    };
    let image_line = match usable_image(text.image) {
        Some(url) => Span::styled(format!("Image: {}", url), palette.dim()),
        None => Span::styled(format!("[{}]", NO_IMAGE), palette.dim()),
    };

    ListItem::new(vec![
        Line::from(Span::styled(
            text.title.to_string(),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!("{} ", tag), Style::default().fg(palette.accent)),
            Span::styled(
                format!("{} · {}", text.source, format_news_date(text.date)),
                palette.dim(),
            ),
        ]),
        Line::from(Span::styled(text.description.to_string(), palette.text())),
        Line::from(image_line),
        Line::from(""),
    ])
}

fn feed_status<T>(name: &str, feed: &Feed<T>) -> String {
    if feed.loading {
        format!("{}: loading…", name)
    } else {
        format!("{}: {} articles", name, feed.items.len())
    }
}

pub fn render_news_panel(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let news = &app.news;

    let errors: Vec<String> = [
        news.agri.error.as_ref().map(|e| format!("Agriculture news: {}", e)),
        news.weather.error.as_ref().map(|e| format!("Weather news: {}", e)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(if errors.is_empty() { 0 } else { 3 }),
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" Filter: {} ", news.filter.label()), palette.title()),
            Span::styled(
                format!(
                    "  {}  {}",
                    feed_status("Agriculture", &news.agri),
                    feed_status("Weather", &news.weather)
                ),
                palette.dim(),
            ),
        ])),
        rows[0],
    );

    if !errors.is_empty() {
        render_error_banner(frame, rows[1], &format!("{}  [r] Retry", errors.join(" | ")), &palette);
    }

    let cards = news.cards();
    let visible = filter_by_category(&cards, news.filter);
    let block = panel("Agriculture & Weather News", &palette);

    if visible.is_empty() {
        let message = if news.agri.loading || news.weather.loading {
            "Loading news…"
        } else {
            "No articles to show"
        };
        frame.render_widget(Paragraph::new(message).style(palette.dim()).block(block), rows[2]);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .skip(news.scroll.min(visible.len().saturating_sub(1)))
        .map(|card| card_item(card, &palette))
        .collect();
    frame.render_widget(List::new(items).block(block), rows[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgribotConfig;
    use crate::models::{NewsArticle, WeatherNewsArticle};
    use crate::tui::app::Page;
    use crate::tui::state::CategoryFilter;
    use crate::tui::test_utils::{render, text};
    use std::time::Instant;

    #[test]
    fn dates_format_or_pass_through() {
        assert_eq!(format_news_date("2024-03-05T14:30:00Z"), "Mar 5, 02:30 PM");
        assert_eq!(
            format_news_date("Tue, 05 Mar 2024 09:05:00 +0000"),
            "Mar 5, 09:05 AM"
        );
        assert_eq!(format_news_date("yesterday"), "yesterday");
    }

    #[test]
    fn only_http_images_are_usable() {
        assert_eq!(usable_image(Some("https://x/y.png")), Some("https://x/y.png"));
        assert_eq!(usable_image(Some("data:image/png;base64,AA")), None);
        assert_eq!(usable_image(Some("")), None);
        assert_eq!(usable_image(None), None);
    }

    #[test]
    fn filtered_page_shows_placeholder_for_missing_image() {
        let mut app = App::new(
            AgribotConfig::default(),
            None,
            Some(Page::AgricultureNews),
            Instant::now(),
        );
        app.take_requests();
        app.news.agri.finish(Ok(vec![NewsArticle {
            title: "Corn prices climb".into(),
            source: "AgWire".into(),
            ..NewsArticle::default()
        }]));
        app.news.weather.finish(Ok(vec![WeatherNewsArticle {
            title: "Storm front moves east".into(),
            image_url: Some("https://img.example/storm.jpg".into()),
            ..WeatherNewsArticle::default()
        }]));
        app.news.filter = CategoryFilter::Only(NewsCategory::Agriculture);

        let out = text(&render(100, 30, |f| {
            let area = f.size();
            render_news_panel(f, &app, area)
        }));
        assert!(out.contains("Corn prices climb"));
        assert!(out.contains(NO_IMAGE));
        assert!(!out.contains("Storm front moves east"));
    }
}
