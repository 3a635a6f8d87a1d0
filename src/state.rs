use std::collections::VecDeque;

use chrono::{Days, NaiveDate};

use crate::games::{self, GameContext, GameRow, PreviewDrawer};
use crate::hitter_temps::{self, HitterRow};
use crate::keys::{IdentifierKind, SERIES_TEAMS, normalize};
use crate::pitcher_metrics::{self, PitcherMatchupRow};
use crate::profitability;
use crate::records::{ProfitabilityLine, TeamTemp};
use crate::series::{MetricSelector, SeriesProjection, project};
use crate::table_view::{Column, SortSpec, TableRow, TableView};
use crate::team_temps;

pub const CHART_YEARS: [i32; 2] = [2024, 2025];
const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Teams,
    Pitchers,
    Hitters,
    Games,
    Chart,
    Profitability,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Teams,
        Screen::Pitchers,
        Screen::Hitters,
        Screen::Games,
        Screen::Chart,
        Screen::Profitability,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Teams => "Team Temps",
            Screen::Pitchers => "Probable Pitchers",
            Screen::Hitters => "Hitter Temps",
            Screen::Games => "Games",
            Screen::Chart => "Team Chart",
            Screen::Profitability => "Team Profitability",
        }
    }

    /// `'1'..='6'` to a screen.
    pub fn from_digit(digit: char) -> Option<Self> {
        let idx = digit.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(idx as usize).copied()
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn is_dated(self) -> bool {
        matches!(self, Screen::Pitchers | Screen::Hitters | Screen::Games)
    }
}

/// Generation token stamped on every fetch. Only the latest one a panel issued is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Empty,
    Failed(String),
}

impl LoadState {
    pub fn message(&self) -> Option<&str> {
        match self {
            LoadState::Idle | LoadState::Ready => None,
            LoadState::Loading => Some("Loading..."),
            LoadState::Empty => Some(crate::derive::NO_DATA_MARKER),
            LoadState::Failed(msg) => Some(msg.as_str()),
        }
    }
}

/// One table screen: its rows, load status and the request it is waiting on.
#[derive(Debug, Clone)]
pub struct Panel<R> {
    pub view: Option<TableView<R>>,
    pub load: LoadState,
    pending: Option<RequestId>,
    default_sort: fn() -> SortSpec,
}

impl<R: TableRow> Panel<R> {
    pub fn new(default_sort: fn() -> SortSpec) -> Self {
        Self {
            view: None,
            load: LoadState::Idle,
            pending: None,
            default_sort,
        }
    }

    pub fn pending(&self) -> Option<RequestId> {
        self.pending
    }

    fn begin(&mut self, id: RequestId) {
        self.pending = Some(id);
        self.load = LoadState::Loading;
    }

    fn accepts(&self, id: RequestId) -> bool {
        self.pending == Some(id)
    }

    /// Forget the current rows so the next visit refetches them.
    fn invalidate(&mut self) {
        self.view = None;
        self.pending = None;
        self.load = LoadState::Idle;
    }

    /// Fresh rows keep the sort and filter the user had chosen.
    fn finish(&mut self, result: Result<Vec<R>, String>) {
        self.pending = None;
        let rows = match result {
            Ok(rows) => rows,
            Err(err) => {
                self.load = LoadState::Failed(err);
                return;
            }
        };
        self.load = if rows.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Ready
        };
        let (sort, filter) = match self.view.as_ref() {
            Some(view) => (view.sort().clone(), view.filter().to_string()),
            None => ((self.default_sort)(), String::new()),
        };
        let mut view = TableView::new(rows, sort);
        if !filter.is_empty() {
            view.set_filter(&filter);
        }
        self.view = Some(view);
    }
}

/// Type-erased table operations, so key handling and drawing work on whichever panel is active.
pub trait PanelControl {
    fn columns(&self) -> &'static [Column];
    fn load(&self) -> &LoadState;
    fn sort(&self) -> Option<&SortSpec>;
    fn filter(&self) -> &str;
    fn selected(&self) -> usize;
    fn row_count(&self) -> usize;
    fn cells(&self) -> Vec<Vec<String>>;
    fn select_next(&mut self);
    fn select_prev(&mut self);
    fn set_sort(&mut self, key: &str) -> bool;
    fn set_filter(&mut self, query: &str);
    fn clear_filter(&mut self);
}

impl<R: TableRow> PanelControl for Panel<R> {
    fn columns(&self) -> &'static [Column] {
        R::columns()
    }

    fn load(&self) -> &LoadState {
        &self.load
    }

    fn sort(&self) -> Option<&SortSpec> {
        self.view.as_ref().map(|view| view.sort())
    }

    fn filter(&self) -> &str {
        self.view.as_ref().map(|view| view.filter()).unwrap_or("")
    }

    fn selected(&self) -> usize {
        self.view.as_ref().map(|view| view.selected()).unwrap_or(0)
    }

    fn row_count(&self) -> usize {
        self.view.as_ref().map(|view| view.len()).unwrap_or(0)
    }

    fn cells(&self) -> Vec<Vec<String>> {
        let Some(view) = self.view.as_ref() else {
            return Vec::new();
        };
        let columns = R::columns();
        view.rows()
            .map(|row| columns.iter().map(|column| row.display(column)).collect())
            .collect()
    }

    fn select_next(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.select_next();
        }
    }

    fn select_prev(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.select_prev();
        }
    }

    fn set_sort(&mut self, key: &str) -> bool {
        self.view.as_mut().is_some_and(|view| view.set_sort(key))
    }

    fn set_filter(&mut self, query: &str) {
        if let Some(view) = self.view.as_mut() {
            view.set_filter(query);
        }
    }

    fn clear_filter(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.clear_filter();
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartState {
    pub team_idx: usize,
    pub year_idx: usize,
    pub metric: MetricSelector,
    pub records: Vec<TeamTemp>,
    pub projection: SeriesProjection,
    pub load: LoadState,
    pending: Option<RequestId>,
}

impl Default for ChartState {
    fn default() -> Self {
        Self {
            team_idx: 0,
            year_idx: 0,
            metric: MetricSelector::CurrentTemp,
            records: Vec::new(),
            projection: SeriesProjection::default(),
            load: LoadState::Idle,
            pending: None,
        }
    }
}

impl ChartState {
    pub fn team(&self) -> &'static str {
        SERIES_TEAMS.get(self.team_idx).copied().unwrap_or("ARI")
    }

    pub fn year(&self) -> i32 {
        CHART_YEARS.get(self.year_idx).copied().unwrap_or(CHART_YEARS[0])
    }

    pub fn pending(&self) -> Option<RequestId> {
        self.pending
    }

    fn reproject(&mut self) {
        self.projection = project(&self.records, self.metric);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    FetchTeamTemps { id: RequestId, season: i32 },
    FetchPitcherMetrics { id: RequestId, date: NaiveDate },
    FetchHitterTemps { id: RequestId, date: NaiveDate },
    FetchGames { id: RequestId, date: NaiveDate },
    FetchTeamSeries { id: RequestId, team: String, season: i32 },
    FetchProfitability { id: RequestId },
}

/// Results sent back by the provider. Fetch failures travel as their display message.
#[derive(Debug)]
pub enum Delta {
    SetTeamTemps {
        id: RequestId,
        result: Result<Vec<TeamTemp>, String>,
    },
    SetPitcherMetrics {
        id: RequestId,
        result: Result<Vec<PitcherMatchupRow>, String>,
    },
    SetHitterTemps {
        id: RequestId,
        result: Result<Vec<HitterRow>, String>,
    },
    SetGames {
        id: RequestId,
        result: Result<(Vec<GameRow>, GameContext), String>,
    },
    SetTeamSeries {
        id: RequestId,
        result: Result<Vec<TeamTemp>, String>,
    },
    SetProfitability {
        id: RequestId,
        result: Result<Vec<ProfitabilityLine>, String>,
    },
    Log(String),
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub date: NaiveDate,
    pub season: i32,
    pub teams: Panel<TeamTemp>,
    pub pitchers: Panel<PitcherMatchupRow>,
    pub hitters: Panel<HitterRow>,
    pub games: Panel<GameRow>,
    pub game_context: GameContext,
    pub drawer: Option<PreviewDrawer>,
    pub profitability: Panel<ProfitabilityLine>,
    pub chart: ChartState,
    /// Column the `s` key sorts by, as an index into the active panel's columns.
    pub sort_column: usize,
    /// Filter text being typed, while the filter prompt is open.
    pub filter_input: Option<String>,
    pub logs: VecDeque<String>,
    next_request: u64,
}

impl AppState {
    pub fn new(date: NaiveDate, season: i32) -> Self {
        Self {
            screen: Screen::Teams,
            date,
            season,
            teams: Panel::new(team_temps::default_sort),
            pitchers: Panel::new(pitcher_metrics::default_sort),
            hitters: Panel::new(hitter_temps::default_sort),
            games: Panel::new(games::default_sort),
            game_context: GameContext::default(),
            drawer: None,
            profitability: Panel::new(profitability::default_sort),
            chart: ChartState::default(),
            sort_column: 0,
            filter_input: None,
            logs: VecDeque::new(),
            next_request: 0,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        push_bounded(&mut self.logs, msg.into());
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    /// Issues a fetch for `screen`, superseding any request that panel still has in flight.
    pub fn request(&mut self, screen: Screen) -> ProviderCommand {
        let id = self.next_request_id();
        let date = self.date;
        match screen {
            Screen::Teams => {
                self.teams.begin(id);
                ProviderCommand::FetchTeamTemps {
                    id,
                    season: self.season,
                }
            }
            Screen::Pitchers => {
                self.pitchers.begin(id);
                ProviderCommand::FetchPitcherMetrics { id, date }
            }
            Screen::Hitters => {
                self.hitters.begin(id);
                ProviderCommand::FetchHitterTemps { id, date }
            }
            Screen::Games => {
                self.games.begin(id);
                self.drawer = None;
                ProviderCommand::FetchGames { id, date }
            }
            Screen::Chart => {
                self.chart.pending = Some(id);
                self.chart.load = LoadState::Loading;
                ProviderCommand::FetchTeamSeries {
                    id,
                    team: self.chart.team().to_string(),
                    season: self.chart.year(),
                }
            }
            Screen::Profitability => {
                self.profitability.begin(id);
                ProviderCommand::FetchProfitability { id }
            }
        }
    }

    /// A fetch for the active screen when it has never been loaded.
    pub fn ensure_loaded(&mut self) -> Option<ProviderCommand> {
        let idle = match self.screen {
            Screen::Chart => self.chart.load == LoadState::Idle,
            _ => self
                .active_panel()
                .is_some_and(|panel| *panel.load() == LoadState::Idle),
        };
        idle.then(|| self.request(self.screen))
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.sort_column = 0;
            self.filter_input = None;
            self.drawer = None;
        }
    }

    /// Moves the slate date. Dated panels are invalidated, and the active one is refetched.
    pub fn shift_date(&mut self, days: i64) -> Option<ProviderCommand> {
        let shifted = if days >= 0 {
            self.date.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        self.date = shifted?;
        self.pitchers.invalidate();
        self.hitters.invalidate();
        self.games.invalidate();
        self.game_context = GameContext::default();
        self.drawer = None;
        self.screen.is_dated().then(|| self.request(self.screen))
    }

    pub fn active_panel(&self) -> Option<&dyn PanelControl> {
        match self.screen {
            Screen::Teams => Some(&self.teams),
            Screen::Pitchers => Some(&self.pitchers),
            Screen::Hitters => Some(&self.hitters),
            Screen::Games => Some(&self.games),
            Screen::Profitability => Some(&self.profitability),
            Screen::Chart => None,
        }
    }

    pub fn active_panel_mut(&mut self) -> Option<&mut dyn PanelControl> {
        match self.screen {
            Screen::Teams => Some(&mut self.teams),
            Screen::Pitchers => Some(&mut self.pitchers),
            Screen::Hitters => Some(&mut self.hitters),
            Screen::Games => Some(&mut self.games),
            Screen::Profitability => Some(&mut self.profitability),
            Screen::Chart => None,
        }
    }

    pub fn move_sort_column(&mut self, forward: bool) {
        let Some(total) = self.active_panel().map(|panel| panel.columns().len()) else {
            return;
        };
        if total == 0 {
            return;
        }
        self.sort_column = if forward {
            (self.sort_column + 1) % total
        } else {
            (self.sort_column + total - 1) % total
        };
    }

    /// Sorts the active panel by the highlighted column; unsortable columns are reported.
    pub fn sort_by_cursor(&mut self) {
        let column = self.sort_column;
        let Some(panel) = self.active_panel_mut() else {
            return;
        };
        let Some(key) = panel.columns().get(column).map(|c| c.key) else {
            return;
        };
        if !panel.set_sort(key) {
            self.push_log(format!("[INFO] Column {key} is not sortable"));
        }
    }

    pub fn open_filter(&mut self) {
        let current = self
            .active_panel()
            .map(|panel| panel.filter().to_string())
            .unwrap_or_default();
        self.filter_input = Some(current);
    }

    pub fn filter_push(&mut self, ch: char) {
        if let Some(input) = self.filter_input.as_mut() {
            input.push(ch);
        }
        self.sync_filter();
    }

    pub fn filter_pop(&mut self) {
        if let Some(input) = self.filter_input.as_mut() {
            input.pop();
        }
        self.sync_filter();
    }

    /// Closes the prompt and keeps the typed filter applied.
    pub fn commit_filter(&mut self) {
        self.filter_input = None;
    }

    pub fn clear_filter(&mut self) {
        self.filter_input = None;
        if let Some(panel) = self.active_panel_mut() {
            panel.clear_filter();
        }
    }

    fn sync_filter(&mut self) {
        let query = self.filter_input.clone().unwrap_or_default();
        if let Some(panel) = self.active_panel_mut() {
            panel.set_filter(&query);
        }
    }

    /// Enter on a team row: chart that team's season.
    pub fn open_selected_team_chart(&mut self) -> Option<ProviderCommand> {
        let team = self.teams.view.as_ref()?.selected_row()?.team.clone();
        let wanted = normalize(&team, IdentifierKind::TeamAbbrev);
        let Some(idx) = SERIES_TEAMS
            .iter()
            .position(|code| normalize(code, IdentifierKind::TeamAbbrev) == wanted)
        else {
            self.push_log(format!("[WARN] No chart series for team {team}"));
            return None;
        };
        self.chart.team_idx = idx;
        if let Some(pos) = CHART_YEARS.iter().position(|y| *y == self.season) {
            self.chart.year_idx = pos;
        }
        self.set_screen(Screen::Chart);
        Some(self.request(Screen::Chart))
    }

    /// Enter on a game row: build its preview drawer.
    pub fn open_selected_game(&mut self) {
        let drawer = self
            .games
            .view
            .as_ref()
            .and_then(|view| view.selected_row())
            .map(|row| self.game_context.drawer(row));
        self.drawer = drawer;
    }

    pub fn cycle_chart_team(&mut self) -> ProviderCommand {
        self.chart.team_idx = (self.chart.team_idx + 1) % SERIES_TEAMS.len();
        self.request(Screen::Chart)
    }

    pub fn cycle_chart_year(&mut self) -> ProviderCommand {
        self.chart.year_idx = (self.chart.year_idx + 1) % CHART_YEARS.len();
        self.request(Screen::Chart)
    }

    /// Metric changes re-project the loaded records; no fetch.
    pub fn cycle_chart_metric(&mut self) {
        self.chart.metric = self.chart.metric.next();
        self.chart.reproject();
    }
}

/// Applies one provider result. A delta whose token is not the panel's pending one is stale
/// and dropped, so the latest request wins even when responses arrive out of order.
pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetTeamTemps { id, result } => {
            apply_panel(&mut state.teams, id, result, "team temperatures", &mut state.logs);
        }
        Delta::SetPitcherMetrics { id, result } => {
            apply_panel(&mut state.pitchers, id, result, "probable pitchers", &mut state.logs);
        }
        Delta::SetHitterTemps { id, result } => {
            apply_panel(&mut state.hitters, id, result, "hitter temperatures", &mut state.logs);
        }
        Delta::SetGames { id, result } => {
            if !state.games.accepts(id) {
                log_stale(&mut state.logs, "games");
                return;
            }
            let rows = result.map(|(rows, context)| {
                state.game_context = context;
                rows
            });
            state.drawer = None;
            finish_panel(&mut state.games, rows, "games", &mut state.logs);
        }
        Delta::SetTeamSeries { id, result } => {
            let chart = &mut state.chart;
            if chart.pending != Some(id) {
                log_stale(&mut state.logs, "team series");
                return;
            }
            chart.pending = None;
            match result {
                Ok(records) => {
                    chart.load = if records.is_empty() {
                        LoadState::Empty
                    } else {
                        LoadState::Ready
                    };
                    chart.records = records;
                    chart.reproject();
                }
                Err(err) => {
                    chart.records.clear();
                    chart.reproject();
                    push_bounded(&mut state.logs, format!("[WARN] team series: {err}"));
                    chart.load = LoadState::Failed(err);
                }
            }
        }
        Delta::SetProfitability { id, result } => {
            apply_panel(&mut state.profitability, id, result, "team profitability", &mut state.logs);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn apply_panel<R: TableRow>(
    panel: &mut Panel<R>,
    id: RequestId,
    result: Result<Vec<R>, String>,
    what: &str,
    logs: &mut VecDeque<String>,
) {
    if !panel.accepts(id) {
        log_stale(logs, what);
        return;
    }
    finish_panel(panel, result, what, logs);
}

fn finish_panel<R: TableRow>(
    panel: &mut Panel<R>,
    result: Result<Vec<R>, String>,
    what: &str,
    logs: &mut VecDeque<String>,
) {
    match &result {
        Ok(rows) => push_bounded(logs, format!("[INFO] Loaded {} {what}", rows.len())),
        Err(err) => push_bounded(logs, format!("[WARN] {what}: {err}")),
    }
    panel.finish(result);
}

fn log_stale(logs: &mut VecDeque<String>, what: &str) {
    push_bounded(logs, format!("[INFO] Dropped stale {what} response"));
}

fn push_bounded(logs: &mut VecDeque<String>, msg: String) {
    logs.push_back(msg);
    while logs.len() > MAX_LOGS {
        logs.pop_front();
    }
}
