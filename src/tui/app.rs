use crate::api::ApiClient;
use crate::config::AgribotConfig;
use crate::error::{Error, Result};
use crate::tui::db::PreferenceStore;
use crate::tui::fetch::Fetcher;
use crate::tui::panels::{
    bots::render_bots_panel, dashboard::render_dashboard_panel,
    detection::render_detection_panel, news::render_news_panel,
    notifications::render_notifications_panel, soil::render_soil_panel,
};
use crate::tui::schedule::Lifecycle;
use crate::tui::state::{
    fresh_bot_map, fresh_dashboard, fresh_soil, ApiEvent, BotMapState, DashboardState,
    DetectionState, FeedKind, NewsState, Request, Response, SoilState, Ticket, UserPreferences,
};
use crate::tui::theme::{initial_theme, Theme};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Dashboard,
    Notifications,
    AgricultureNews,
    BotLocation,
    SoilSensor,
    AnimalDetection,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::Notifications,
        Page::AgricultureNews,
        Page::BotLocation,
        Page::SoilSensor,
        Page::AnimalDetection,
    ];

    pub fn from_str(s: &str) -> Self {
        match s {
            "notifications" => Page::Notifications,
            "agriculture-news" | "news" => Page::AgricultureNews,
            "bot-location" | "bots" => Page::BotLocation,
            "soil-sensor" | "soil" => Page::SoilSensor,
            "animal-detection" | "detect" => Page::AnimalDetection,
            _ => Page::Dashboard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Notifications => "notifications",
            Page::AgricultureNews => "agriculture-news",
            Page::BotLocation => "bot-location",
            Page::SoilSensor => "soil-sensor",
            Page::AnimalDetection => "animal-detection",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Notifications => "Notifications",
            Page::AgricultureNews => "Agriculture News",
            Page::BotLocation => "Bot Location",
            Page::SoilSensor => "Soil Sensor Readings",
            Page::AnimalDetection => "Animal Detection",
        }
    }

    pub fn index(&self) -> usize {
        Page::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

pub struct App {
    pub page: Page,
    pub theme: Theme,
    pub config: AgribotConfig,
    pub preferences: UserPreferences,
    pub dashboard: DashboardState,
    pub news: NewsState,
    pub bots: BotMapState,
    pub soil: SoilState,
    pub detection: DetectionState,
    pub show_help: bool,
    pub should_quit: bool,
    lifecycles: [Lifecycle; 6],
    outbox: Vec<(Ticket, Request)>,
    store: Option<PreferenceStore>,
}

impl App {
    pub fn new(
        config: AgribotConfig,
        store: Option<PreferenceStore>,
        start: Option<Page>,
        now: Instant,
    ) -> Self {
        let preferences = store
            .as_ref()
            .map(|s| s.load_user_preferences())
            .unwrap_or_else(UserPreferences::default_prefs);
        let theme = initial_theme(preferences.theme.map(|t| t.as_str()));
        let page = start.unwrap_or_else(|| Page::from_str(&preferences.last_page));

        let mut app = Self {
            page,
            theme,
            dashboard: fresh_dashboard(&config),
            news: NewsState::default(),
            bots: fresh_bot_map(&config),
            soil: fresh_soil(&config),
            detection: DetectionState::default(),
            config,
            preferences,
            show_help: false,
            should_quit: false,
            lifecycles: [Lifecycle::default(); 6],
            outbox: Vec::new(),
            store,
        };
        app.mount(page, now);
        app.preferences.last_page = page.as_str().to_string();
        app
    }

    fn lifecycle(&self, page: Page) -> &Lifecycle {
        &self.lifecycles[page.index()]
    }

    fn enqueue(&mut self, page: Page, request: Request) {
        let ticket = Ticket {
            page,
            epoch: self.lifecycle(page).epoch(),
        };
        self.outbox.push((ticket, request));
    }

    fn enqueue_all(&mut self, page: Page, requests: Vec<Request>) {
        for request in requests {
            self.enqueue(page, request);
        }
    }

    /// Requests issued since the last call, for the fetcher.
    pub fn take_requests(&mut self) -> Vec<(Ticket, Request)> {
        std::mem::take(&mut self.outbox)
    }

    /// Opens `page` with fresh state, starts its timers and issues its
    /// initial requests.
    fn mount(&mut self, page: Page, now: Instant) {
        self.lifecycles[page.index()].mount();
        tracing::debug!("mount {}", page.as_str());

        match page {
            Page::Dashboard => {
                self.dashboard = fresh_dashboard(&self.config);
                self.dashboard.poll.start(now);
                let requests = self.dashboard.begin_poll();
                self.enqueue_all(page, requests);
            }
            Page::AgricultureNews => {
                self.news = NewsState::default();
                let requests = self.news.refresh_all();
                self.enqueue_all(page, requests);
            }
            Page::BotLocation => {
                self.bots = fresh_bot_map(&self.config);
                self.bots.drift.start(now);
                if let Some(request) = self.bots.request_location() {
                    self.enqueue(page, request);
                }
            }
            Page::SoilSensor => {
                self.soil = fresh_soil(&self.config);
                self.soil.jitter.start(now);
            }
            Page::AnimalDetection => {
                self.detection = DetectionState::default();
            }
            Page::Notifications => {}
        }
    }

    fn unmount(&mut self, page: Page) {
        self.lifecycles[page.index()].unmount();
        tracing::debug!("unmount {}", page.as_str());

        match page {
            Page::Dashboard => self.dashboard.poll.cancel(),
            Page::BotLocation => self.bots.drift.cancel(),
            Page::SoilSensor => self.soil.jitter.cancel(),
            _ => {}
        }
    }

    pub fn navigate(&mut self, page: Page, now: Instant) {
        if page == self.page {
            return;
        }
        self.unmount(self.page);
        self.page = page;
        self.mount(page, now);
        self.preferences.last_page = page.as_str().to_string();
    }

    /// Fires whichever timers of the current page are due.
    pub fn tick(&mut self, now: Instant) {
        match self.page {
            Page::Dashboard => {
                if self.dashboard.poll.fire(now) {
                    let requests = self.dashboard.begin_poll();
                    if requests.is_empty() {
                        tracing::debug!("dashboard poll skipped, previous still in flight");
                    }
                    self.enqueue_all(Page::Dashboard, requests);
                }
            }
            Page::BotLocation => {
                if self.bots.drift.fire(now) {
                    self.bots.tick();
                }
            }
            Page::SoilSensor => {
                if self.soil.jitter.fire(now) {
                    self.soil.tick();
                }
            }
            _ => {}
        }
    }

    /// Routes a reply to the page that asked for it. Replies for a page
    /// that has since been left or re-entered are dropped.
    pub fn apply(&mut self, event: ApiEvent) -> bool {
        let ApiEvent { ticket, response } = event;
        if !self.lifecycle(ticket.page).accepts(ticket.epoch) {
            tracing::debug!(
                "dropping stale reply for {} (epoch {})",
                ticket.page.as_str(),
                ticket.epoch
            );
            return false;
        }

        match (ticket.page, response) {
            (Page::Dashboard, Response::BotTelemetry(result)) => {
                self.dashboard.apply_telemetry(result)
            }
            (Page::Dashboard, Response::AgriNews(result)) => self.dashboard.apply_news(result),
            (Page::AgricultureNews, Response::AgriNews(result)) => self.news.agri.finish(result),
            (Page::AgricultureNews, Response::WeatherNews(result)) => {
                self.news.weather.finish(result)
            }
            (Page::BotLocation, Response::Location(result)) => self.bots.apply_location(result),
            (Page::AnimalDetection, Response::Detection(result)) => self.detection.finish(result),
            (page, response) => {
                tracing::warn!("unexpected reply for {}: {:?}", page.as_str(), response);
                return false;
            }
        }
        true
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.preferences.theme = Some(self.theme);
        if let Some(store) = &self.store {
            if let Err(e) = store.save_preference("theme", self.theme.as_str()) {
                tracing::warn!("failed to save theme: {}", e);
            }
        }
    }

    pub fn save_preferences(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save_user_preferences(&self.preferences) {
                tracing::warn!("failed to save preferences: {}", e);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.page == Page::AnimalDetection && self.detection.prompt_active() {
            handle_prompt_key(&mut self.detection, key.code);
            return;
        }

        if self.show_help {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Tab => self.navigate(self.page.next(), now),
            KeyCode::BackTab => self.navigate(self.page.prev(), now),
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.navigate(Page::ALL[index], now);
            }
            code => self.handle_page_key(code),
        }
    }

    fn handle_page_key(&mut self, code: KeyCode) {
        match self.page {
            Page::Dashboard => match code {
                KeyCode::Char('r') => {
                    let requests = self.dashboard.begin_poll();
                    self.enqueue_all(Page::Dashboard, requests);
                }
                KeyCode::Char('p') => self.dashboard.period = self.dashboard.period.next(),
                _ => {}
            },
            Page::AgricultureNews => match code {
                KeyCode::Char('a') => {
                    if let Some(request) = self.news.refresh(FeedKind::Agriculture) {
                        self.enqueue(Page::AgricultureNews, request);
                    }
                }
                KeyCode::Char('w') => {
                    if let Some(request) = self.news.refresh(FeedKind::Weather) {
                        self.enqueue(Page::AgricultureNews, request);
                    }
                }
                KeyCode::Char('r') => {
                    let requests = self.news.refresh_all();
                    self.enqueue_all(Page::AgricultureNews, requests);
                }
                KeyCode::Char('c') => self.news.cycle_filter(),
                KeyCode::Down | KeyCode::Char('j') => self.news.scroll_down(),
                KeyCode::Up | KeyCode::Char('k') => self.news.scroll_up(),
                _ => {}
            },
            Page::BotLocation => match code {
                KeyCode::Down | KeyCode::Char('j') => self.bots.move_cursor(true),
                KeyCode::Up | KeyCode::Char('k') => self.bots.move_cursor(false),
                KeyCode::Enter => self.bots.toggle_selection(),
                KeyCode::Esc => {
                    self.bots.close_detail();
                }
                KeyCode::Char('l') => {
                    if let Some(request) = self.bots.request_location() {
                        self.enqueue(Page::BotLocation, request);
                    }
                }
                KeyCode::Char('f') => {
                    self.bots.refresh_fields();
                }
                _ => {}
            },
            Page::AnimalDetection => match code {
                KeyCode::Char('i') => self.detection.open_prompt(),
                KeyCode::Char('d') | KeyCode::Enter => {
                    if let Some(request) = self.detection.begin_detect() {
                        self.enqueue(Page::AnimalDetection, request);
                    }
                }
                KeyCode::Char('x') => self.detection.reset(),
                _ => {}
            },
            Page::Notifications | Page::SoilSensor => {}
        }
    }
}

fn handle_prompt_key(detection: &mut DetectionState, code: KeyCode) {
    match code {
        KeyCode::Enter => detection.submit_prompt(),
        KeyCode::Esc => detection.cancel_prompt(),
        KeyCode::Backspace => detection.pop_char(),
        KeyCode::Char(c) => detection.push_char(c),
        _ => {}
    }
}

pub fn run_tui(runtime: &tokio::runtime::Runtime, config: AgribotConfig, page: Option<Page>) -> Result<()> {
    let store = match PreferenceStore::open_default() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!("preferences unavailable: {}", e);
            None
        }
    };

    let client = ApiClient::new(&config)?;
    let (tx, rx) = mpsc::channel();
    let fetcher = Fetcher::new(runtime.handle().clone(), client, config.location.clone(), tx);

    let mut app = App::new(config, store, page, Instant::now());

    enable_raw_mode().map_err(|e| Error::Terminal(e.to_string()))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, &mut app, &fetcher, &rx);

    app.save_preferences();

    disable_raw_mode().map_err(|e| Error::Terminal(e.to_string()))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    fetcher: &Fetcher,
    rx: &mpsc::Receiver<ApiEvent>,
) -> Result<()> {
    loop {
        for (ticket, request) in app.take_requests() {
            fetcher.dispatch(ticket, request);
        }

        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, Instant::now());
            }
        }

        while let Ok(reply) = rx.try_recv() {
            app.apply(reply);
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn ui(frame: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    frame.render_widget(Block::default().style(palette.text()), frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.size());

    render_header(frame, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(chunks[1]);

    frame.render_widget(render_sidebar(app.page, app.theme), main_chunks[0]);

    let content_area = main_chunks[1];
    match app.page {
        Page::Dashboard => render_dashboard_panel(frame, app, content_area),
        Page::Notifications => render_notifications_panel(frame, app, content_area),
        Page::AgricultureNews => render_news_panel(frame, app, content_area),
        Page::BotLocation => render_bots_panel(frame, app, content_area),
        Page::SoilSensor => render_soil_panel(frame, app, content_area),
        Page::AnimalDetection => render_detection_panel(frame, app, content_area),
    }

    let footer = Paragraph::new(footer_hint(app))
        .style(palette.dim())
        .block(Block::default().borders(Borders::ALL).border_style(palette.border()));
    frame.render_widget(footer, chunks[2]);

    if app.show_help {
        render_help_overlay(frame, app, chunks[1]);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let badge = |n: &'static str, bg: Color| {
        Span::styled(
            format!(" {} ", n),
            Style::default().fg(Color::White).bg(bg).add_modifier(Modifier::BOLD),
        )
    };

    let line = Line::from(vec![
        Span::styled(" AGRI BOT ", palette.title()),
        Span::raw("   "),
        badge("5", Color::Red),
        Span::raw(" "),
        badge("5", Color::Yellow),
        Span::raw(" "),
        badge("7", Color::Blue),
        Span::raw("   "),
        Span::styled(format!("[t] {} mode", app.theme.as_str()), palette.dim()),
    ]);

    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).border_style(palette.border()));
    frame.render_widget(header, area);
}

fn footer_hint(app: &App) -> String {
    if app.page == Page::AnimalDetection && app.detection.prompt_active() {
        return " Type a path  [Enter] Load  [Esc] Cancel ".to_string();
    }
    let page_keys = match app.page {
        Page::Dashboard => "[r] Refresh  [p] Period",
        Page::AgricultureNews => "[a] Agri  [w] Weather  [r] Both  [c] Filter",
        Page::BotLocation => "↑↓ Marker  [Enter] Details  [Esc] Close  [l] Locate  [f] Fields",
        Page::AnimalDetection => "[i] Image  [d] Detect  [x] Reset",
        Page::Notifications | Page::SoilSensor => "",
    };
    format!(" {}  [Tab] Switch  [t] Theme  [?] Help  [q] Quit ", page_keys)
}

pub fn render_sidebar(active: Page, theme: Theme) -> List<'static> {
    let palette = theme.palette();
    let items: Vec<ListItem> = Page::ALL
        .iter()
        .map(|page| {
            let mut spans = vec![Span::raw(format!(" {} {}", page.index() + 1, page.label()))];
            if *page == Page::Dashboard {
                spans.push(Span::styled(
                    " [NEW]",
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                ));
            }
            let style = if *page == active {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                palette.text()
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(" Menu "),
    )
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let palette = app.theme.palette();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Keyboard Shortcuts ")
        .border_style(palette.border())
        .style(palette.text());

    frame.render_widget(Clear, area);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let help_rows = [
        ("Tab / Shift-Tab", "Next / previous page"),
        ("1-6", "Jump to page"),
        ("t", "Toggle light/dark theme"),
        ("r", "Refresh (dashboard, news)"),
        ("p", "Cycle chart period"),
        ("a / w", "Refresh agriculture / weather news"),
        ("c", "Cycle news category filter"),
        ("↑/↓ Enter", "Pick a map marker / open details"),
        ("Esc", "Close details"),
        ("l", "Request location"),
        ("f", "Refresh field data"),
        ("i / d / x", "Load image / detect / reset"),
        ("?", "Toggle help"),
        ("q", "Quit"),
    ]
    .into_iter()
    .map(|(key, what)| Row::new(vec![Cell::from(key), Cell::from(what)]));

    let help_table = Table::new(help_rows, [Constraint::Length(18), Constraint::Min(20)])
        .style(palette.text());
    frame.render_widget(help_table, inner);
}
