use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, TableState,
    Tabs, Wrap,
};

use mlb_terminal::config::Settings;
use mlb_terminal::feed;
use mlb_terminal::games::{LineupPick, PreviewDrawer};
use mlb_terminal::join::Lookup;
use mlb_terminal::records::{RawRecord, raw_record_pairs};
use mlb_terminal::state::{
    AppState, Delta, LoadState, PanelControl, ProviderCommand, Screen, apply_delta,
};

const MAX_COLUMN_WIDTH: usize = 28;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    help_overlay: bool,
}

impl App {
    fn new(settings: &Settings, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(settings.date, settings.season),
            should_quit: false,
            cmd_tx,
            help_overlay: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.filter_input.is_some() {
            match key.code {
                KeyCode::Esc => self.state.clear_filter(),
                KeyCode::Enter => self.state.commit_filter(),
                KeyCode::Backspace => self.state.filter_pop(),
                KeyCode::Char(ch) => self.state.filter_push(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            KeyCode::Char(digit @ '1'..='6') => {
                if let Some(screen) = Screen::from_digit(digit) {
                    self.state.set_screen(screen);
                    self.load_active();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(panel) = self.state.active_panel_mut() {
                    panel.select_next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(panel) = self.state.active_panel_mut() {
                    panel.select_prev();
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.state.move_sort_column(false),
            KeyCode::Char('l') | KeyCode::Right => self.state.move_sort_column(true),
            KeyCode::Char('s') => self.state.sort_by_cursor(),
            KeyCode::Char('/') => {
                if self.state.active_panel().is_some() {
                    self.state.open_filter();
                }
            }
            KeyCode::Esc => {
                if self.help_overlay {
                    self.help_overlay = false;
                } else if self.state.drawer.is_some() {
                    self.state.drawer = None;
                } else {
                    self.state.clear_filter();
                }
            }
            KeyCode::Char('r') => {
                let cmd = self.state.request(self.state.screen);
                self.send(cmd);
            }
            KeyCode::Char('[') => self.shift_date(-1),
            KeyCode::Char(']') => self.shift_date(1),
            KeyCode::Enter => match self.state.screen {
                Screen::Teams => {
                    if let Some(cmd) = self.state.open_selected_team_chart() {
                        self.send(cmd);
                    }
                }
                Screen::Games => self.state.open_selected_game(),
                _ => {}
            },
            KeyCode::Char('t') if self.state.screen == Screen::Chart => {
                let cmd = self.state.cycle_chart_team();
                self.send(cmd);
            }
            KeyCode::Char('y') if self.state.screen == Screen::Chart => {
                let cmd = self.state.cycle_chart_year();
                self.send(cmd);
            }
            KeyCode::Char('m') if self.state.screen == Screen::Chart => {
                self.state.cycle_chart_metric();
            }
            _ => {}
        }
    }

    fn shift_date(&mut self, days: i64) {
        if let Some(cmd) = self.state.shift_date(days) {
            self.send(cmd);
        }
        self.state
            .push_log(format!("[INFO] Date set to {}", self.state.date));
    }

    fn load_active(&mut self) {
        if let Some(cmd) = self.state.ensure_loaded() {
            self.send(cmd);
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Fetching unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider stopped; request dropped");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let settings = Settings::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(settings.clone(), tx, cmd_rx);

    let mut app = App::new(&settings, Some(cmd_tx));
    app.load_active();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
        ])
        .split(frame.size());

    render_header(frame, chunks[0], &app.state);

    let state = &app.state;
    match (state.screen, state.drawer.as_ref()) {
        (Screen::Chart, _) => render_chart(frame, chunks[1], state),
        (Screen::Games, Some(drawer)) => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[1]);
            render_active_table(frame, cols[0], state);
            render_drawer(frame, cols[1], drawer);
        }
        _ => render_active_table(frame, chunks[1], state),
    }

    render_footer(frame, chunks[2], state);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(2)])
        .split(area);

    let title = format!(
        " MLB TERMINAL | {} | Date {} | Season {}",
        state.screen.title(),
        state.date,
        state.season
    );
    frame.render_widget(
        Paragraph::new(title).style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );

    let titles: Vec<String> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, screen)| format!("{} {}", i + 1, screen.title()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.screen.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, rows[1]);
}

fn render_active_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(panel) = state.active_panel() else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(table_title(state.screen, panel));

    let cells = panel.cells();
    if cells.is_empty() {
        let msg = match panel.load() {
            LoadState::Ready if !panel.filter().is_empty() => "No rows match the filter",
            load => load.message().unwrap_or("Press r to load"),
        };
        let style = match panel.load() {
            LoadState::Failed(_) => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::DarkGray),
        };
        frame.render_widget(
            Paragraph::new(msg)
                .style(style)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    let columns = panel.columns();
    let sort = panel.sort();
    let header = Row::new(columns.iter().enumerate().map(|(idx, column)| {
        let arrow = match sort {
            Some(current) if current.key == column.key => current.direction.arrow(),
            _ => "",
        };
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if idx == state.sort_column {
            style = style.add_modifier(Modifier::UNDERLINED).fg(Color::Yellow);
        }
        Span::styled(format!("{}{arrow}", column.title), style)
    }));

    let widths: Vec<Constraint> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let widest = cells
                .iter()
                .map(|row| row.get(idx).map(|c| c.chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            let width = widest.max(column.title.chars().count() + 1).min(MAX_COLUMN_WIDTH);
            Constraint::Length(width as u16)
        })
        .collect();

    let rows = cells.into_iter().map(Row::new);
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray));

    let mut table_state = TableState::default().with_selected(Some(panel.selected()));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn table_title(screen: Screen, panel: &dyn PanelControl) -> String {
    let mut title = format!(" {} ({} rows)", screen.title(), panel.row_count());
    if !panel.filter().is_empty() {
        title.push_str(&format!(" filter: \"{}\"", panel.filter()));
    }
    if *panel.load() == LoadState::Loading {
        title.push_str(" loading...");
    }
    title.push(' ');
    title
}

fn render_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let chart_state = &state.chart;
    let title = format!(
        " {} {} | {} | t team, y year, m metric ",
        chart_state.team(),
        chart_state.year(),
        chart_state.metric.label()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    let projection = &chart_state.projection;
    let Some((lo, hi)) = projection.value_bounds().filter(|_| !projection.is_empty()) else {
        let msg = chart_state.load.message().unwrap_or("Press r to load");
        frame.render_widget(Paragraph::new(msg).block(block), area);
        return;
    };

    let points: Vec<Vec<(f64, f64)>> = projection
        .series
        .iter()
        .map(|series| {
            series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect()
        })
        .collect();
    let colors = [Color::Cyan, Color::Magenta];
    let datasets: Vec<Dataset> = projection
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (series, data))| {
            Dataset::default()
                .name(series.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors[i % colors.len()]))
                .data(data)
        })
        .collect();

    let last_x = projection.timestamps.len().saturating_sub(1) as f64;
    let first_date = projection
        .timestamps
        .first()
        .map(|d| d.to_string())
        .unwrap_or_default();
    let last_date = projection
        .timestamps
        .last()
        .map(|d| d.to_string())
        .unwrap_or_default();
    let pad = ((hi - lo) * 0.05).max(0.5);
    let (y_lo, y_hi) = (lo - pad, hi + pad);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Date")
                .bounds([0.0, last_x.max(1.0)])
                .labels(vec![Span::raw(first_date), Span::raw(last_date)]),
        )
        .y_axis(
            Axis::default()
                .title(chart_state.metric.axis_title())
                .bounds([y_lo, y_hi])
                .labels(vec![
                    Span::raw(format!("{y_lo:.1}")),
                    Span::raw(format!("{:.1}", (y_lo + y_hi) / 2.0)),
                    Span::raw(format!("{y_hi:.1}")),
                ]),
        );
    frame.render_widget(chart, area);
}

fn render_drawer(frame: &mut Frame, area: Rect, drawer: &PreviewDrawer) {
    frame.render_widget(Clear, area);
    let text = drawer_text(drawer);
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} | Esc close ", drawer.matchup)),
        );
    frame.render_widget(widget, area);
}

fn drawer_text(drawer: &PreviewDrawer) -> String {
    let mut lines: Vec<String> = drawer
        .details
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();

    lines.push(String::new());
    lines.push("Pitching matchup".to_string());
    lines.push(format!("  {}", drawer.away_pitcher_card));
    lines.push(format!("  {}", drawer.home_pitcher_card));
    for link in &drawer.pitcher_links {
        lines.push(format!("  {link}"));
    }

    lines.push(String::new());
    lines.push("Team records".to_string());
    for (team, record) in [
        (&drawer.away_team, &drawer.away_record),
        (&drawer.home_team, &drawer.home_record),
    ] {
        lines.push(format!("  {team}: {}", record_summary(record)));
    }

    lines.push(String::new());
    lines.push("Park factors".to_string());
    lines.push(format!("  {}", record_summary(&drawer.park_factors)));

    for (team, pick) in [
        (&drawer.away_team, &drawer.away_lineup),
        (&drawer.home_team, &drawer.home_lineup),
    ] {
        lines.push(String::new());
        match pick.lineup() {
            Some(lineup) => {
                lines.push(format!("{team} lineup ({})", pick.label()));
                for (slot, player) in lineup.batting_order.iter().enumerate() {
                    let player = if player.is_empty() { "-" } else { player.as_str() };
                    lines.push(format!("  {}. {player}", slot + 1));
                }
            }
            None => lines.push(format!("No lineup available for {team}")),
        }
    }
    if matches!(drawer.home_lineup, LineupPick::NotAvailable)
        && matches!(drawer.away_lineup, LineupPick::NotAvailable)
    {
        lines.push(String::new());
        lines.push("Lineups are posted closer to first pitch.".to_string());
    }
    lines.join("\n")
}

fn record_summary(record: &Lookup<RawRecord>) -> String {
    match record {
        Lookup::Found(record) => raw_record_pairs(record)
            .into_iter()
            .filter(|(key, _)| key != "team" && key != "venue" && key != "id")
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", "),
        Lookup::Unavailable => "N/A".to_string(),
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let keys = match state.filter_input.as_deref() {
        Some(input) => format!("Filter: {input}_  (Enter keep, Esc clear)"),
        None => footer_keys(state.screen).to_string(),
    };
    frame.render_widget(
        Paragraph::new(keys).style(Style::default().fg(Color::Gray)),
        rows[0],
    );

    let console = Paragraph::new(console_text(state))
        .block(Block::default().borders(Borders::TOP).title(" Console "));
    frame.render_widget(console, rows[1]);
}

fn footer_keys(screen: Screen) -> &'static str {
    match screen {
        Screen::Teams => "1-6 Screens | j/k Move | h/l Column | s Sort | / Filter | Enter Chart | r Refresh | ? Help | q Quit",
        Screen::Games => "1-6 Screens | j/k Move | h/l Column | s Sort | / Filter | Enter Preview | [/] Date | r Refresh | q Quit",
        Screen::Pitchers | Screen::Hitters => {
            "1-6 Screens | j/k Move | h/l Column | s Sort | / Filter | [/] Date | r Refresh | q Quit"
        }
        Screen::Chart => "1-6 Screens | t Team | y Year | m Metric | r Refresh | ? Help | q Quit",
        Screen::Profitability => {
            "1-6 Screens | j/k Move | h/l Column | s Sort | / Filter | r Refresh | q Quit"
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "MLB Terminal - Help",
        "",
        "Screens:",
        "  1 Team temps     2 Probable pitchers   3 Hitter temps",
        "  4 Games          5 Team chart          6 Team profitability",
        "",
        "Tables:",
        "  j/k or ↑/↓   Move selection",
        "  h/l or ←/→   Choose sort column",
        "  s            Sort by column (again to flip)",
        "  /            Filter, Esc clears",
        "  Enter        Team chart / game preview",
        "",
        "Other:",
        "  [ / ]        Previous / next date",
        "  t / y / m    Chart team / year / metric",
        "  r            Refresh",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
