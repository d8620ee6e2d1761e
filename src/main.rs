use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use scout_terminal::config::{self, AppConfig, SourceKind};
use scout_terminal::state::{self, AppState, ProviderCommand, Screen, apply_delta};
use scout_terminal::{persist, provider};

mod ui;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::with_config(config),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.state.similar.notification.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.close_notification();
            }
            return;
        }

        let page = self.state.screen;
        if self.state.search_box(page).active {
            self.on_search_key(page, key);
            return;
        }

        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.state.help_overlay = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Home,
            KeyCode::Char('2') => self.state.screen = Screen::Communities,
            KeyCode::Char('3') => self.state.screen = Screen::Similar,
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.state.search_box_mut(page).active = true;
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => match page {
                Screen::Home => self.on_home_key(key),
                Screen::Communities => self.on_communities_key(key),
                Screen::Similar => self.on_similar_key(key),
            },
        }
    }

    fn on_search_key(&mut self, page: Screen, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => self.state.search_box_mut(page).active = false,
            KeyCode::Enter => {
                if let Some(cmd) = self.state.choose_search_option(page) {
                    self.send(cmd);
                }
            }
            KeyCode::Down => self.state.search_box_mut(page).highlight_next(),
            KeyCode::Up => self.state.search_box_mut(page).highlight_prev(),
            KeyCode::Backspace => self.state.search_box_mut(page).pop_char(now),
            KeyCode::Char(c) => self.state.search_box_mut(page).push_char(c, now),
            _ => {}
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('r') | KeyCode::Delete) && self.state.home.selected.is_some() {
            self.state.remove_home_player();
        }
    }

    fn on_communities_key(&mut self, key: KeyEvent) {
        if self.state.communities.selected.is_none() {
            return;
        }
        match key.code {
            KeyCode::Char('r') | KeyCode::Delete => self.state.remove_community_player(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('j') | KeyCode::Down => {
                self.state.move_category_cursor(true)
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('k') | KeyCode::Up => {
                self.state.move_category_cursor(false)
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.state.toggle_category(),
            _ => {}
        }
    }

    fn on_similar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') | KeyCode::Right | KeyCode::Char('l') => {
                self.state.cycle_algorithm(true)
            }
            KeyCode::Left | KeyCode::Char('h') => self.state.cycle_algorithm(false),
            KeyCode::Enter | KeyCode::Char('f') => {
                if let Some(cmd) = self.state.submit_similarity() {
                    self.send(cmd);
                }
            }
            KeyCode::Char('c') => self.state.clear_similarity(),
            KeyCode::Char('x') => {
                if let Some(cmd) = self.state.request_export() {
                    self.send(cmd);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_similar_table(true),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_similar_table(false),
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Backend unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Backend request failed");
        }
    }

    fn dispatch_due_searches(&mut self) {
        for cmd in self.state.due_searches(Instant::now()) {
            self.send(cmd);
        }
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let config = AppConfig::from_env();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(provider::source_from_config(&config), tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    if let Some(store) = persist::load_store() {
        app.state.store = store;
    }
    if config.source == SourceKind::Demo {
        app.state.push_log("[INFO] Demo roster loaded (SCOUT_SOURCE=demo)");
    } else {
        app.state.push_log(format!("[INFO] Backend: {}", config.api_base));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if app.state.store.revision() > 0 {
        if let Err(err) = persist::save_store(&app.state.store) {
            eprintln!("warning: could not save store: {err:#}");
        }
    }
    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    // Short enough to honour the smallest search debounce.
    let poll_interval = Duration::from_millis(50);

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.dispatch_due_searches();

        terminal.draw(|f| ui::draw(f, &app.state))?;

        if event::poll(poll_interval)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
