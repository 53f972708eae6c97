use crate::config::AgribotConfig;
use crate::detect::{self, Outcome};
use crate::error::Result;
use crate::location::LocationError;
use crate::models::{
    format_percent, BotLocation, ChartPoint, Coordinate, DetectionResult, FieldData, NewsArticle,
    NotificationItem, NotificationKind, SoilReading, Telemetry, WeatherNewsArticle,
};
use crate::sim;
use crate::sim::fields::SatelliteImagery;
use crate::tui::app::Page;
use crate::tui::schedule::Interval;
use crate::tui::theme::Theme;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct UserPreferences {
    pub last_page: String,
    pub theme: Option<Theme>,
}

impl UserPreferences {
    pub fn default_prefs() -> Self {
        Self {
            last_page: "dashboard".to_string(),
            theme: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Requests and replies
// ─────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    BotTelemetry,
    AgriNews,
    WeatherNews,
    DetectAnimal { image_base64: String },
    Locate,
}

#[derive(Debug)]
pub enum Response {
    BotTelemetry(Result<Telemetry>),
    AgriNews(Result<Vec<NewsArticle>>),
    WeatherNews(Result<Vec<WeatherNewsArticle>>),
    Detection(Result<DetectionResult>),
    Location(std::result::Result<Coordinate, LocationError>),
}

/// Identifies which mount of which page asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub page: Page,
    pub epoch: u64,
}

#[derive(Debug)]
pub struct ApiEvent {
    pub ticket: Ticket,
    pub response: Response,
}

// ─────────────────────────────────────────────────────────────────────────
// Fetched lists
// ─────────────────────────────────────────────────────────────────────────

/// A list loaded from the backend on demand.
#[derive(Clone, Debug)]
pub struct Feed<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T> Feed<T> {
    /// Marks the feed as loading. Returns false while a load is already
    /// running, which is what keeps the refresh action disabled.
    pub fn begin(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    /// A successful load replaces the whole list.
    pub fn finish(&mut self, result: Result<Vec<T>>) {
        self.loading = false;
        match result {
            Ok(items) => self.items = items,
            Err(e) => {
                tracing::warn!("feed load failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewsCategory {
    Agriculture,
    Weather,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(NewsCategory),
}

impl CategoryFilter {
    pub const CYCLE: [CategoryFilter; 3] = [
        CategoryFilter::All,
        CategoryFilter::Only(NewsCategory::Agriculture),
        CategoryFilter::Only(NewsCategory::Weather),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(NewsCategory::Agriculture) => "Agriculture",
            CategoryFilter::Only(NewsCategory::Weather) => "Weather",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::CYCLE.iter().position(|c| *c == self).unwrap_or(0);
        Self::CYCLE[(i + 1) % Self::CYCLE.len()]
    }

    pub fn includes(&self, category: NewsCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

pub trait Categorized {
    fn category(&self) -> NewsCategory;
}

/// Client-side filter over already-fetched items.
pub fn filter_by_category<T: Categorized>(items: &[T], filter: CategoryFilter) -> Vec<&T> {
    items
        .iter()
        .filter(|item| filter.includes(item.category()))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NewsCard<'a> {
    Agri(&'a NewsArticle),
    Weather(&'a WeatherNewsArticle),
}

impl Categorized for NewsCard<'_> {
    fn category(&self) -> NewsCategory {
        match self {
            NewsCard::Agri(_) => NewsCategory::Agriculture,
            NewsCard::Weather(_) => NewsCategory::Weather,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedKind {
    Agriculture,
    Weather,
}

#[derive(Debug, Default)]
pub struct NewsState {
    pub agri: Feed<NewsArticle>,
    pub weather: Feed<WeatherNewsArticle>,
    pub filter: CategoryFilter,
    pub scroll: usize,
}

impl NewsState {
    pub fn refresh(&mut self, kind: FeedKind) -> Option<Request> {
        match kind {
            FeedKind::Agriculture => self.agri.begin().then_some(Request::AgriNews),
            FeedKind::Weather => self.weather.begin().then_some(Request::WeatherNews),
        }
    }

    pub fn refresh_all(&mut self) -> Vec<Request> {
        [FeedKind::Agriculture, FeedKind::Weather]
            .into_iter()
            .filter_map(|k| self.refresh(k))
            .collect()
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.scroll = 0;
    }

    pub fn cards(&self) -> Vec<NewsCard<'_>> {
        self.agri
            .items
            .iter()
            .map(NewsCard::Agri)
            .chain(self.weather.items.iter().map(NewsCard::Weather))
            .collect()
    }

    pub fn scroll_down(&mut self) {
        let max = self.cards().len().saturating_sub(1);
        if self.scroll < max {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Dashboard
// ─────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardTone {
    Blue,
    Cyan,
    Amber,
    Rose,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetricCardData {
    pub title: String,
    pub subtitle: &'static str,
    pub change: String,
    pub trend: Trend,
    pub tone: CardTone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Day,
    Month,
    Year,
}

impl Period {
    pub fn next(self) -> Self {
        match self {
            Period::Day => Period::Month,
            Period::Month => Period::Year,
            Period::Year => Period::Day,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Day => "Day",
            Period::Month => "Month",
            Period::Year => "Year",
        }
    }
}

pub const NOT_AVAILABLE: &str = "N/A";

fn trim_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

fn numeric_card(
    subtitle: &'static str,
    tone: CardTone,
    current: Option<f64>,
    previous: Option<f64>,
    render: fn(f64) -> String,
    unit: &str,
) -> MetricCardData {
    let Some(value) = current else {
        return MetricCardData {
            title: NOT_AVAILABLE.to_string(),
            subtitle,
            change: NOT_AVAILABLE.to_string(),
            trend: Trend::Up,
            tone,
        };
    };
    let (change, trend) = match previous {
        Some(prev) => {
            let delta = value - prev;
            let trend = if delta < 0.0 { Trend::Down } else { Trend::Up };
            let sign = if delta < 0.0 { "-" } else { "+" };
            (
                format!("{}{}{} since last poll", sign, trim_number(delta.abs()), unit),
                trend,
            )
        }
        None => ("latest reading".to_string(), Trend::Up),
    };
    MetricCardData {
        title: render(value),
        subtitle,
        change,
        trend,
        tone,
    }
}

#[derive(Debug)]
pub struct DashboardState {
    pub telemetry: Option<Telemetry>,
    pub previous: Option<Telemetry>,
    pub news: Vec<NewsArticle>,
    pub error: Option<String>,
    pub in_flight: usize,
    pub period: Period,
    pub poll: Interval,
    pub last_updated: Option<chrono::DateTime<chrono::Local>>,
    poll_errors: Vec<String>,
}

impl DashboardState {
    pub fn new(poll_ms: u64) -> Self {
        Self {
            telemetry: None,
            previous: None,
            news: Vec::new(),
            error: None,
            in_flight: 0,
            period: Period::Month,
            poll: Interval::from_millis(poll_ms),
            last_updated: None,
            poll_errors: Vec::new(),
        }
    }

    /// Starts a poll of both endpoints unless one is still outstanding.
    pub fn begin_poll(&mut self) -> Vec<Request> {
        if self.in_flight > 0 {
            return Vec::new();
        }
        self.in_flight = 2;
        self.poll_errors.clear();
        vec![Request::BotTelemetry, Request::AgriNews]
    }

    pub fn apply_telemetry(&mut self, result: Result<Telemetry>) {
        match result {
            Ok(telemetry) => {
                self.previous = self.telemetry.replace(telemetry);
                self.last_updated = Some(chrono::Local::now());
            }
            Err(e) => self.poll_errors.push(e.to_string()),
        }
        self.settle();
    }

    pub fn apply_news(&mut self, result: Result<Vec<NewsArticle>>) {
        match result {
            Ok(articles) => self.news = articles,
            Err(e) => self.poll_errors.push(e.to_string()),
        }
        self.settle();
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.error = self.poll_errors.first().cloned();
            if let Some(e) = &self.error {
                tracing::warn!("dashboard poll failed: {}", e);
            }
        }
    }

    pub fn metric_cards(&self) -> [MetricCardData; 4] {
        let now = self.telemetry.as_ref();
        let prev = self.previous.as_ref();

        let weather = match now.and_then(|t| t.weather()) {
            Some((sky, wind)) => MetricCardData {
                title: sky.to_string(),
                subtitle: "Weather Today",
                change: wind.unwrap_or(NOT_AVAILABLE).to_string(),
                trend: Trend::Up,
                tone: CardTone::Rose,
            },
            None => MetricCardData {
                title: NOT_AVAILABLE.to_string(),
                subtitle: "Weather Today",
                change: NOT_AVAILABLE.to_string(),
                trend: Trend::Up,
                tone: CardTone::Rose,
            },
        };

        [
            numeric_card(
                "Soil Moisture",
                CardTone::Blue,
                now.and_then(|t| t.soil_moisture()),
                prev.and_then(|t| t.soil_moisture()),
                format_percent,
                "%",
            ),
            numeric_card(
                "Temperature",
                CardTone::Cyan,
                now.and_then(|t| t.temperature()),
                prev.and_then(|t| t.temperature()),
                |v| format!("{}°C", trim_number(v)),
                "°C",
            ),
            numeric_card(
                "Battery",
                CardTone::Amber,
                now.and_then(|t| t.battery()),
                prev.and_then(|t| t.battery()),
                format_percent,
                "%",
            ),
            weather,
        ]
    }

    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.telemetry
            .as_ref()
            .map(|t| t.chart_points())
            .unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Bot map
// ─────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Bot(usize),
    Field(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Bot(String),
    Field(String),
}

#[derive(Debug)]
pub struct BotMapState {
    pub bots: Vec<BotLocation>,
    pub fields: Vec<FieldData>,
    pub imagery: Option<SatelliteImagery>,
    pub user_location: Option<Coordinate>,
    pub location_error: Option<String>,
    pub locating: bool,
    pub selection: Option<Selection>,
    pub cursor: usize,
    pub drift: Interval,
}

impl BotMapState {
    pub fn new(drift_ms: u64) -> Self {
        Self {
            bots: sim::bots::generate_bot_locations(),
            fields: Vec::new(),
            imagery: None,
            user_location: None,
            location_error: None,
            locating: false,
            selection: None,
            cursor: 0,
            drift: Interval::from_millis(drift_ms),
        }
    }

    pub fn tick(&mut self) {
        sim::bots::drift(&mut self.bots);
    }

    pub fn request_location(&mut self) -> Option<Request> {
        if self.locating {
            return None;
        }
        self.locating = true;
        self.location_error = None;
        Some(Request::Locate)
    }

    pub fn apply_location(&mut self, result: std::result::Result<Coordinate, LocationError>) {
        self.locating = false;
        match result {
            Ok(at) => {
                self.bots.retain(|b| b.id != sim::bots::USER_LOCATION_ID);
                self.bots.insert(0, sim::bots::user_marker(at));
                self.load_fields(at);
                self.user_location = Some(at);
                self.location_error = None;
            }
            Err(e) => {
                tracing::info!("location unavailable: {}", e);
                self.location_error = Some(e.banner());
            }
        }
    }

    fn load_fields(&mut self, at: Coordinate) {
        self.fields = sim::fields::generate_fields(at);
        self.imagery = Some(sim::fields::satellite_imagery(
            chrono::Local::now().date_naive(),
        ));
    }

    /// Field data follows the user's position, so it is loading while a
    /// location request is out.
    pub fn fields_loading(&self) -> bool {
        self.locating
    }

    /// Reloads field data around the known location. Ignored while loading
    /// or before any location is known.
    pub fn refresh_fields(&mut self) -> bool {
        if self.fields_loading() {
            return false;
        }
        let Some(at) = self.user_location else {
            return false;
        };
        tracing::debug!("refreshing field data");
        self.load_fields(at);
        true
    }

    pub fn has_user_marker(&self) -> bool {
        self.bots
            .first()
            .is_some_and(|b| b.id == sim::bots::USER_LOCATION_ID)
    }

    /// Map position of the bot at `index` in `bots`, in percent from the
    /// top-left corner.
    pub fn bot_position(&self, index: usize) -> (f64, f64) {
        if self.bots[index].id == sim::bots::USER_LOCATION_ID {
            return sim::bots::USER_POSITION;
        }
        let grid_index = if self.has_user_marker() {
            index - 1
        } else {
            index
        };
        sim::bots::grid_position(grid_index)
    }

    pub fn markers(&self) -> Vec<Marker> {
        (0..self.bots.len())
            .map(Marker::Bot)
            .chain((0..self.fields.len()).map(Marker::Field))
            .collect()
    }

    pub fn move_cursor(&mut self, down: bool) {
        let max = self.markers().len().saturating_sub(1);
        if down {
            self.cursor = (self.cursor + 1).min(max);
        } else {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    fn selection_for(&self, marker: Marker) -> Selection {
        match marker {
            Marker::Bot(i) => Selection::Bot(self.bots[i].id.clone()),
            Marker::Field(i) => Selection::Field(self.fields[i].id.clone()),
        }
    }

    /// Opens the detail panel for the marker under the cursor, or closes it
    /// when that marker is already open.
    pub fn toggle_selection(&mut self) {
        let Some(marker) = self.markers().get(self.cursor).copied() else {
            return;
        };
        let picked = self.selection_for(marker);
        if self.selection.as_ref() == Some(&picked) {
            self.selection = None;
        } else {
            self.selection = Some(picked);
        }
    }

    pub fn close_detail(&mut self) -> bool {
        self.selection.take().is_some()
    }

    pub fn selected_bot(&self) -> Option<&BotLocation> {
        match &self.selection {
            Some(Selection::Bot(id)) => self.bots.iter().find(|b| &b.id == id),
            _ => None,
        }
    }

    pub fn selected_field(&self) -> Option<&FieldData> {
        match &self.selection {
            Some(Selection::Field(id)) => self.fields.iter().find(|f| &f.id == id),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Soil
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SoilState {
    pub reading: SoilReading,
    pub ticks: u64,
    pub jitter: Interval,
    rng: StdRng,
}

impl SoilState {
    pub fn new(seed: SoilReading, jitter_ms: u64) -> Self {
        Self::with_rng(seed, jitter_ms, StdRng::from_entropy())
    }

    pub fn with_rng(seed: SoilReading, jitter_ms: u64, rng: StdRng) -> Self {
        Self {
            reading: seed,
            ticks: 0,
            jitter: Interval::from_millis(jitter_ms),
            rng,
        }
    }

    pub fn tick(&mut self) {
        self.reading = sim::soil::jitter(self.reading, &mut self.rng);
        self.ticks += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Animal detection
// ─────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub data_url: String,
}

#[derive(Debug, Default)]
pub struct DetectionState {
    /// Path being typed, when the prompt is open.
    pub prompt: Option<String>,
    pub image: Option<LoadedImage>,
    pub detecting: bool,
    pub outcome: Option<Outcome>,
    pub load_error: Option<String>,
}

impl DetectionState {
    pub fn open_prompt(&mut self) {
        if !self.detecting {
            self.prompt = Some(String::new());
        }
    }

    pub fn prompt_active(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(p) = self.prompt.as_mut() {
            p.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(p) = self.prompt.as_mut() {
            p.pop();
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Loads the typed path. Picking a new image clears the previous result.
    pub fn submit_prompt(&mut self) {
        let Some(raw) = self.prompt.take() else {
            return;
        };
        let path = PathBuf::from(raw.trim());
        match detect::encode_image_file(&path) {
            Ok(data_url) => {
                self.load_image(path, data_url);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    pub fn load_image(&mut self, path: PathBuf, data_url: String) {
        self.image = Some(LoadedImage { path, data_url });
        self.outcome = None;
        self.load_error = None;
    }

    pub fn begin_detect(&mut self) -> Option<Request> {
        if self.detecting {
            return None;
        }
        let image = self.image.as_ref()?;
        self.detecting = true;
        self.outcome = None;
        Some(Request::DetectAnimal {
            image_base64: image.data_url.clone(),
        })
    }

    pub fn finish(&mut self, result: Result<DetectionResult>) {
        self.detecting = false;
        self.outcome = Some(match result {
            Ok(body) => detect::interpret(&body),
            Err(e) => {
                tracing::warn!("detection request failed: {}", e);
                detect::failure(&e)
            }
        });
    }

    pub fn reset(&mut self) {
        if !self.detecting {
            *self = Self::default();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Notifications
// ─────────────────────────────────────────────────────────────────────────

pub fn notifications() -> Vec<NotificationItem> {
    vec![
        NotificationItem {
            id: 1,
            kind: NotificationKind::Warning,
            title: "Low Soil Moisture Detected",
            message: "Sector A3 shows moisture levels below 40%. Consider irrigation.",
            time: "2 minutes ago",
        },
        NotificationItem {
            id: 2,
            kind: NotificationKind::Success,
            title: "Irrigation Cycle Completed",
            message: "Automated irrigation in Sector B2 completed successfully.",
            time: "15 minutes ago",
        },
        NotificationItem {
            id: 3,
            kind: NotificationKind::Info,
            title: "Weather Update",
            message: "Rain expected in the next 6 hours. Adjust irrigation schedule accordingly.",
            time: "1 hour ago",
        },
        NotificationItem {
            id: 4,
            kind: NotificationKind::Warning,
            title: "Bot Battery Low",
            message: "Agricultural bot #3 battery at 15%. Return to charging station recommended.",
            time: "2 hours ago",
        },
        NotificationItem {
            id: 5,
            kind: NotificationKind::Schedule,
            title: "Harvest Schedule",
            message: "Tomatoes in Sector C1 ready for harvest in 3 days.",
            time: "1 day ago",
        },
    ]
}

/// Fresh per-page state, as a page looks right after it is opened.
pub fn fresh_dashboard(config: &AgribotConfig) -> DashboardState {
    DashboardState::new(config.intervals.dashboard_ms)
}

pub fn fresh_bot_map(config: &AgribotConfig) -> BotMapState {
    BotMapState::new(config.intervals.bots_ms)
}

pub fn fresh_soil(config: &AgribotConfig) -> SoilState {
    SoilState::new(config.soil, config.intervals.soil_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::TelemetrySummary;

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            ..NewsArticle::default()
        }
    }

    fn weather(title: &str) -> WeatherNewsArticle {
        WeatherNewsArticle {
            title: title.to_string(),
            ..WeatherNewsArticle::default()
        }
    }

    #[test]
    fn refresh_replaces_instead_of_appending() {
        let mut news = NewsState::default();
        assert_eq!(news.refresh(FeedKind::Agriculture), Some(Request::AgriNews));
        news.agri.finish(Ok(vec![article("a"), article("b")]));

        assert_eq!(news.refresh(FeedKind::Agriculture), Some(Request::AgriNews));
        news.agri.finish(Ok(vec![article("c")]));

        assert_eq!(news.agri.items, vec![article("c")]);
    }

    #[test]
    fn refresh_is_disabled_while_loading() {
        let mut news = NewsState::default();
        assert_eq!(news.refresh_all(), vec![Request::AgriNews, Request::WeatherNews]);
        assert_eq!(news.refresh(FeedKind::Weather), None);
        assert!(news.refresh_all().is_empty());
    }

    #[test]
    fn failed_feed_can_be_retried_with_same_request() {
        let mut news = NewsState::default();
        news.refresh(FeedKind::Weather);
        news.weather
            .finish(Err(Error::Network("connection refused".to_string())));
        assert!(news.weather.error.as_deref().unwrap().contains("connection refused"));
        assert_eq!(news.refresh(FeedKind::Weather), Some(Request::WeatherNews));
        assert_eq!(news.weather.error, None);
    }

    #[test]
    fn category_filter_selects_matching_subset() {
        let mut news = NewsState::default();
        news.agri.items = vec![article("a1"), article("a2"), article("a3")];
        news.weather.items = vec![weather("w1"), weather("w2")];
        let cards = news.cards();

        assert_eq!(filter_by_category(&cards, CategoryFilter::All).len(), 5);

        let agri = filter_by_category(&cards, CategoryFilter::Only(NewsCategory::Agriculture));
        assert_eq!(agri.len(), 3);
        assert!(agri.iter().all(|c| c.category() == NewsCategory::Agriculture));

        let wx = filter_by_category(&cards, CategoryFilter::Only(NewsCategory::Weather));
        assert_eq!(wx.len(), 2);
        assert!(wx.iter().all(|c| c.category() == NewsCategory::Weather));
    }

    #[test]
    fn filter_cycles_without_requests() {
        let mut news = NewsState::default();
        news.cycle_filter();
        assert_eq!(news.filter, CategoryFilter::Only(NewsCategory::Agriculture));
        news.cycle_filter();
        news.cycle_filter();
        assert_eq!(news.filter, CategoryFilter::All);
        assert!(!news.agri.loading && !news.weather.loading);
    }

    fn summary(moisture: f64) -> Telemetry {
        Telemetry::Summary(TelemetrySummary {
            soil_moisture: Some(moisture),
            ..TelemetrySummary::default()
        })
    }

    #[test]
    fn dashboard_poll_is_skipped_while_in_flight() {
        let mut dash = DashboardState::new(5000);
        assert_eq!(dash.begin_poll().len(), 2);
        assert!(dash.begin_poll().is_empty());
        dash.apply_telemetry(Ok(summary(60.0)));
        dash.apply_news(Ok(vec![]));
        assert_eq!(dash.begin_poll().len(), 2);
    }

    #[test]
    fn dashboard_keeps_last_good_data_on_failure() {
        let mut dash = DashboardState::new(5000);
        dash.begin_poll();
        dash.apply_telemetry(Ok(summary(60.0)));
        dash.apply_news(Ok(vec![article("kept")]));
        assert_eq!(dash.error, None);

        dash.begin_poll();
        dash.apply_telemetry(Err(Error::Status { status: 500 }));
        dash.apply_news(Err(Error::Network("down".into())));

        assert_eq!(dash.error.as_deref(), Some("HTTP error! status: 500"));
        assert_eq!(dash.metric_cards()[0].title, "60%");
        assert_eq!(dash.news, vec![article("kept")]);
    }

    #[test]
    fn metric_cards_fall_back_and_trend() {
        let mut dash = DashboardState::new(5000);
        assert!(dash.metric_cards().iter().all(|c| c.title == NOT_AVAILABLE));

        dash.begin_poll();
        dash.apply_telemetry(Ok(summary(65.0)));
        dash.apply_news(Ok(vec![]));
        dash.begin_poll();
        dash.apply_telemetry(Ok(summary(52.6)));
        dash.apply_news(Ok(vec![]));

        let cards = dash.metric_cards();
        assert_eq!(cards[0].title, "52.6%");
        assert_eq!(cards[0].trend, Trend::Down);
        assert_eq!(cards[0].change, "-12.4% since last poll");
        assert_eq!(cards[1].title, NOT_AVAILABLE);
    }

    #[test]
    fn bot_selection_toggles_and_is_exclusive() {
        let mut map = BotMapState::new(5000);
        map.toggle_selection();
        assert_eq!(map.selected_bot().map(|b| b.id.as_str()), Some("AGR-001"));

        map.move_cursor(true);
        map.toggle_selection();
        assert_eq!(map.selected_bot().map(|b| b.id.as_str()), Some("AGR-002"));

        map.toggle_selection();
        assert_eq!(map.selection, None);
        assert!(!map.close_detail());
    }

    #[test]
    fn location_adds_user_marker_and_fields() {
        let mut map = BotMapState::new(5000);
        assert_eq!(map.request_location(), Some(Request::Locate));
        assert_eq!(map.request_location(), None);
        map.apply_location(Ok(Coordinate {
            lat: 40.0,
            lng: -74.0,
        }));

        assert!(map.has_user_marker());
        assert_eq!(map.bot_position(0), sim::bots::USER_POSITION);
        assert_eq!(map.bot_position(1), (20.0, 20.0));
        assert_eq!(map.fields.len(), 3);
        assert_eq!(map.markers().len(), 8);

        map.cursor = 5;
        map.toggle_selection();
        assert_eq!(map.selected_field().map(|f| f.id.as_str()), Some("FIELD_001"));
    }

    #[test]
    fn field_refresh_waits_for_location() {
        let mut map = BotMapState::new(5000);
        assert!(!map.refresh_fields());

        map.request_location();
        assert!(map.fields_loading());
        assert!(!map.refresh_fields());

        map.apply_location(Ok(Coordinate {
            lat: 40.0,
            lng: -74.0,
        }));
        assert!(map.imagery.is_some());
        map.fields.clear();
        map.imagery = None;
        assert!(map.refresh_fields());
        assert_eq!(map.fields.len(), 3);
        assert!(map.imagery.is_some());
    }

    #[test]
    fn location_denial_is_reported_once() {
        let mut map = BotMapState::new(5000);
        map.request_location();
        map.apply_location(Err(LocationError::PermissionDenied));
        assert_eq!(
            map.location_error.as_deref(),
            Some("Unable to get location: Location access denied by user.")
        );
        assert!(!map.locating);
        assert!(map.fields.is_empty());
    }

    #[test]
    fn soil_ticks_keep_moisture_bounded() {
        let mut soil = SoilState::with_rng(
            SoilReading {
                moisture: 99.5,
                ..SoilReading::default()
            },
            5000,
            StdRng::seed_from_u64(42),
        );
        for _ in 0..5_000 {
            soil.tick();
            assert!((0.0..=100.0).contains(&soil.reading.moisture));
        }
        assert_eq!(soil.ticks, 5_000);
    }

    #[test]
    fn detection_flow_and_reset() {
        let mut det = DetectionState::default();
        assert_eq!(det.begin_detect(), None);

        det.load_image(PathBuf::from("cow.jpg"), "data:image/jpeg;base64,AAAA".into());
        let req = det.begin_detect();
        assert_eq!(
            req,
            Some(Request::DetectAnimal {
                image_base64: "data:image/jpeg;base64,AAAA".into()
            })
        );
        assert!(det.detecting);
        assert_eq!(det.begin_detect(), None);

        det.finish(Err(Error::Network("refused".into())));
        assert_eq!(
            det.outcome,
            Some(Outcome::Failed {
                message: detect::CONNECTIVITY_MESSAGE.to_string()
            })
        );

        // retry re-issues the same payload
        assert_eq!(det.begin_detect(), req);
        det.finish(Ok(DetectionResult {
            success: true,
            ..DetectionResult::default()
        }));

        det.load_image(PathBuf::from("dog.png"), "data:image/png;base64,BBBB".into());
        assert_eq!(det.outcome, None);

        det.reset();
        assert!(det.image.is_none() && det.outcome.is_none());
    }

    #[test]
    fn prompt_reports_unreadable_file() {
        let mut det = DetectionState::default();
        det.open_prompt();
        for c in "/nonexistent/field.png".chars() {
            det.push_char(c);
        }
        det.submit_prompt();
        assert!(!det.prompt_active());
        assert!(det.image.is_none());
        assert!(det.load_error.is_some());
    }
}
