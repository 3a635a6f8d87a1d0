use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::derive::bbref_player_url;
use crate::join::{ConflictPolicy, Joined, Lookup, SecondaryIndex, join_indexed};
use crate::keys::{CanonicalKey, IdentifierKind, normalize, player_key, team_key};
use crate::mlb_api::MlbApi;
use crate::records::{GamePreview, Lineup, PitcherLine, RawRecord, pick_string};
use crate::table_view::{
    CellFormat, Column, FieldValue, SortSpec, TableRow, TableView, UNAVAILABLE, format_cell,
};

pub const UNANNOUNCED: &str = "Unannounced";

/// One game on the slate with both probable starters' season lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRow {
    pub game: GamePreview,
    pub home_code: String,
    pub away_code: String,
    pub matchup: String,
    pub home_pitcher: Lookup<PitcherLine>,
    pub away_pitcher: Lookup<PitcherLine>,
}

impl GameRow {
    pub fn pitcher_card(&self, home: bool) -> String {
        let (code, line) = if home {
            (&self.home_code, &self.home_pitcher)
        } else {
            (&self.away_code, &self.away_pitcher)
        };
        match line.found() {
            Some(line) => format!(
                "{code}: {} {} | W-L: {} | ERA: {}",
                line.bbref_id, line.throws, line.wl, line.era
            ),
            None => format!("{code}: {UNANNOUNCED}"),
        }
    }

    pub fn pitcher_links(&self) -> Vec<String> {
        [&self.away_pitcher, &self.home_pitcher]
            .into_iter()
            .filter_map(|line| line.found())
            .filter_map(|line| bbref_player_url(&line.bbref_id))
            .collect()
    }
}

/// Keeps the first preview for each game id.
pub fn dedupe_games(previews: Vec<GamePreview>) -> Vec<GamePreview> {
    let mut seen = HashSet::new();
    previews
        .into_iter()
        .filter(|game| seen.insert(game.id.clone()))
        .collect()
}

/// Previews ⋈ pitcher lines (home) ⋈ pitcher lines (away). Lines keep the latest season.
pub fn merge_games(previews: Vec<GamePreview>, lines: Vec<PitcherLine>) -> Vec<GameRow> {
    let index = SecondaryIndex::build(
        lines,
        |line: &PitcherLine| player_key(&line.bbref_id),
        ConflictPolicy::KeepGreatest(|line: &PitcherLine| line.year),
    );
    let with_home = join_indexed(dedupe_games(previews), &index, |game: &GamePreview| {
        player_key(&game.home_pitcher)
    });
    let with_both = join_indexed(with_home, &index, |joined: &Joined<GamePreview, PitcherLine>| {
        player_key(&joined.primary.away_pitcher)
    });

    with_both
        .into_iter()
        .map(|joined| {
            let away_pitcher = joined.secondary;
            let Joined {
                primary: game,
                secondary: home_pitcher,
            } = joined.primary;
            GameRow {
                home_code: team_key(&game.home_team).to_string(),
                away_code: team_key(&game.away_team).to_string(),
                matchup: format!("{} @ {}", game.away_team, game.home_team),
                game,
                home_pitcher,
                away_pitcher,
            }
        })
        .collect()
}

/// Where a team's batting order comes from.
pub trait LineupSource {
    fn lineup_for(&self, team: &CanonicalKey) -> Option<&Lineup>;
}

/// Lineups from one collection keyed by team; the first entry per team wins.
#[derive(Debug, Clone)]
pub struct LineupBook {
    index: SecondaryIndex<Lineup>,
}

impl LineupBook {
    pub fn new(lineups: Vec<Lineup>) -> Self {
        Self {
            index: SecondaryIndex::build(
                lineups,
                |lineup: &Lineup| team_key(&lineup.team),
                ConflictPolicy::FirstWins,
            ),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl LineupSource for LineupBook {
    fn lineup_for(&self, team: &CanonicalKey) -> Option<&Lineup> {
        if team.is_unknown_team() {
            return None;
        }
        self.index.get(team).found().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LineupPick {
    Actual(Lineup),
    Predicted(Lineup),
    NotAvailable,
}

impl LineupPick {
    pub fn lineup(&self) -> Option<&Lineup> {
        match self {
            LineupPick::Actual(lineup) | LineupPick::Predicted(lineup) => Some(lineup),
            LineupPick::NotAvailable => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineupPick::Actual(_) => "actual",
            LineupPick::Predicted(_) => "predicted",
            LineupPick::NotAvailable => "not available",
        }
    }
}

/// An actual lineup overrides a predicted one. Lineups without a lead-off hitter
/// are treated as absent.
pub fn pick_lineup(
    team: &CanonicalKey,
    actual: &dyn LineupSource,
    predicted: &dyn LineupSource,
) -> LineupPick {
    let complete = |source: &dyn LineupSource| {
        source
            .lineup_for(team)
            .filter(|lineup| lineup.is_complete())
            .cloned()
    };
    if let Some(lineup) = complete(actual) {
        return LineupPick::Actual(lineup);
    }
    if let Some(lineup) = complete(predicted) {
        return LineupPick::Predicted(lineup);
    }
    LineupPick::NotAvailable
}

/// Slate-wide lookups behind the preview drawer.
#[derive(Debug, Clone)]
pub struct GameContext {
    team_records: SecondaryIndex<RawRecord>,
    park_factors: SecondaryIndex<RawRecord>,
    actual: LineupBook,
    predicted: LineupBook,
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }
}

impl GameContext {
    pub fn new(
        team_records: Vec<RawRecord>,
        park_factors: Vec<RawRecord>,
        actual: Vec<Lineup>,
        predicted: Vec<Lineup>,
    ) -> Self {
        Self {
            team_records: SecondaryIndex::build(
                team_records,
                |record: &RawRecord| team_key(&pick_string(record, &["team"]).unwrap_or_default()),
                ConflictPolicy::FirstWins,
            ),
            park_factors: SecondaryIndex::build(
                park_factors,
                |record: &RawRecord| venue_key(&pick_string(record, &["venue"]).unwrap_or_default()),
                ConflictPolicy::FirstWins,
            ),
            actual: LineupBook::new(actual),
            predicted: LineupBook::new(predicted),
        }
    }

    pub fn team_record(&self, team_name: &str) -> Lookup<RawRecord> {
        let key = team_key(team_name);
        if key.is_unknown_team() {
            return Lookup::Unavailable;
        }
        self.team_records.get_cloned(&key)
    }

    pub fn park_factors(&self, venue: &str) -> Lookup<RawRecord> {
        self.park_factors.get_cloned(&venue_key(venue))
    }

    pub fn lineup(&self, team_name: &str) -> LineupPick {
        pick_lineup(&team_key(team_name), &self.actual, &self.predicted)
    }

    pub fn drawer(&self, row: &GameRow) -> PreviewDrawer {
        let game = &row.game;
        PreviewDrawer {
            game_id: game.id.clone(),
            matchup: row.matchup.clone(),
            venue: game.venue.clone(),
            details: game_details(game),
            away_pitcher_card: row.pitcher_card(false),
            home_pitcher_card: row.pitcher_card(true),
            pitcher_links: row.pitcher_links(),
            away_team: game.away_team.clone(),
            home_team: game.home_team.clone(),
            away_record: self.team_record(&game.away_team),
            home_record: self.team_record(&game.home_team),
            park_factors: self.park_factors(&game.venue),
            away_lineup: self.lineup(&game.away_team),
            home_lineup: self.lineup(&game.home_team),
        }
    }
}

fn venue_key(venue: &str) -> CanonicalKey {
    normalize(venue, IdentifierKind::Venue)
}

/// Labelled game facts for the top of the drawer; absent values read `N/A`.
pub fn game_details(game: &GamePreview) -> Vec<(&'static str, String)> {
    vec![
        ("Venue", text_or_unavailable(&game.venue)),
        ("Time", text_or_unavailable(&game.time)),
        ("Temperature", with_unit(game.temperature, "°F")),
        ("Wind Speed", with_unit(game.wind_speed, " MPH")),
        ("Wind Gusts", with_unit(game.wind_gusts, " MPH")),
        ("Wind Direction", text_or_unavailable(&game.wind_description)),
        ("Rain Probability", with_unit(game.rain_probability, "%")),
        ("Baseball-Reference Preview", text_or_unavailable(&game.preview_link)),
    ]
}

fn text_or_unavailable(text: &str) -> String {
    if text.trim().is_empty() {
        UNAVAILABLE.to_string()
    } else {
        text.to_string()
    }
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(n) => format!("{n}{unit}"),
        None => UNAVAILABLE.to_string(),
    }
}

/// Drill-down for one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewDrawer {
    pub game_id: String,
    pub matchup: String,
    pub venue: String,
    pub details: Vec<(&'static str, String)>,
    pub away_pitcher_card: String,
    pub home_pitcher_card: String,
    pub pitcher_links: Vec<String>,
    pub away_team: String,
    pub home_team: String,
    pub away_record: Lookup<RawRecord>,
    pub home_record: Lookup<RawRecord>,
    pub park_factors: Lookup<RawRecord>,
    pub away_lineup: LineupPick,
    pub home_lineup: LineupPick,
}

pub struct GamesFetch {
    pub rows: Vec<GameRow>,
    pub context: GameContext,
    pub errors: Vec<String>,
}

/// The slate and its pitcher lines are required. Records, park factors and lineups
/// only feed the drawer, so a failure there is reported and the drawer shows N/A.
pub fn fetch_games(api: &MlbApi, date: NaiveDate) -> Result<GamesFetch> {
    let ((previews, lines), ((records, parks), (actual, predicted))) = rayon::join(
        || rayon::join(|| api.game_previews(date), || api.pitcher_lines(date)),
        || {
            rayon::join(
                || rayon::join(|| api.team_records(), || api.park_factors()),
                || rayon::join(|| api.actual_lineups(date), || api.predicted_lineups(date)),
            )
        },
    );
    let rows = merge_games(previews?, lines?);

    let mut errors = Vec::new();
    let context = GameContext::new(
        or_empty(records, "team records", &mut errors),
        or_empty(parks, "park factors", &mut errors),
        or_empty(actual, "actual lineups", &mut errors),
        or_empty(predicted, "predicted lineups", &mut errors),
    );

    Ok(GamesFetch {
        rows,
        context,
        errors,
    })
}

fn or_empty<T>(result: Result<Vec<T>>, what: &str, errors: &mut Vec<String>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            errors.push(format!("{what} unavailable: {err:#}"));
            Vec::new()
        }
    }
}

const COLUMNS: &[Column] = &[
    Column::new("time", "Time", CellFormat::Text),
    Column::new("awayTeam", "Away", CellFormat::Text),
    Column::new("homeTeam", "Home", CellFormat::Text),
    Column::new("venue", "Venue", CellFormat::Text),
    Column::unsorted("awayPitcher", "Away SP", CellFormat::Text),
    Column::unsorted("homePitcher", "Home SP", CellFormat::Text),
    Column::new("temperature", "Temp °F", CellFormat::Integer),
    Column::new("windSpeed", "Wind", CellFormat::Integer),
    Column::new("rainProbability", "Rain %", CellFormat::Integer),
    Column::unsorted("windDescription", "Conditions", CellFormat::Text),
];

impl TableRow for GameRow {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn value(&self, key: &str) -> FieldValue<'_> {
        let game = &self.game;
        match key {
            "time" => FieldValue::Text(&game.time),
            "awayTeam" => FieldValue::Text(&self.away_code),
            "homeTeam" => FieldValue::Text(&self.home_code),
            "venue" => FieldValue::Text(&game.venue),
            "awayPitcher" => pitcher_id(&self.away_pitcher),
            "homePitcher" => pitcher_id(&self.home_pitcher),
            "temperature" => game.temperature.into(),
            "windSpeed" => game.wind_speed.into(),
            "rainProbability" => game.rain_probability.into(),
            "windDescription" => FieldValue::Text(&game.wind_description),
            _ => FieldValue::Missing,
        }
    }

    fn filter_text(&self) -> &str {
        &self.matchup
    }

    fn display(&self, column: &Column) -> String {
        match column.key {
            "awayPitcher" | "homePitcher" => {
                let line = if column.key == "homePitcher" {
                    &self.home_pitcher
                } else {
                    &self.away_pitcher
                };
                match line.found() {
                    Some(line) => format!("{} ({})", line.bbref_id, line.throws),
                    None => UNANNOUNCED.to_string(),
                }
            }
            _ => format_cell(self.value(column.key), column.format),
        }
    }
}

fn pitcher_id(line: &Lookup<PitcherLine>) -> FieldValue<'_> {
    match line.found() {
        Some(line) => FieldValue::Text(&line.bbref_id),
        None => FieldValue::Missing,
    }
}

pub fn default_sort() -> SortSpec {
    SortSpec::ascending("time")
}

pub fn games_view(rows: Vec<GameRow>) -> TableView<GameRow> {
    TableView::new(rows, default_sort())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup(team: &str, lead_off: &str) -> Lineup {
        let mut batting_order = vec![String::new(); 9];
        batting_order[0] = lead_off.to_string();
        Lineup {
            team: team.to_string(),
            batting_order,
        }
    }

    #[test]
    fn actual_lineup_overrides_predicted() {
        let actual = LineupBook::new(vec![lineup("Phillies", "schwaky01")]);
        let predicted = LineupBook::new(vec![lineup("Phillies", "turnetr01")]);
        let pick = pick_lineup(&team_key("Phillies"), &actual, &predicted);
        assert_eq!(pick.label(), "actual");
        assert_eq!(pick.lineup().map(|l| l.batting_order[0].as_str()), Some("schwaky01"));
    }

    #[test]
    fn lineup_without_lead_off_falls_through() {
        let actual = LineupBook::new(vec![lineup("Mets", "")]);
        let predicted = LineupBook::empty();
        let pick = pick_lineup(&team_key("Mets"), &actual, &predicted);
        assert_eq!(pick, LineupPick::NotAvailable);
    }
}
