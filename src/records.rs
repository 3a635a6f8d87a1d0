use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Untyped record as delivered by a collection endpoint.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamTemp {
    #[serde(default, deserialize_with = "string_or_default")]
    pub team: String,
    #[serde(default, deserialize_with = "float_or_none")]
    pub current_temp: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub wins: Option<f64>,
    #[serde(default, alias = "losses", deserialize_with = "float_or_none")]
    pub loses: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub win_perc: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub rs: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub ra: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub pythag_perc: Option<f64>,
    #[serde(default, deserialize_with = "string_or_default")]
    pub streak: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub last_result: String,
    #[serde(default, deserialize_with = "float_or_none")]
    pub previous_temp: Option<f64>,
    #[serde(default, deserialize_with = "string_or_default")]
    pub date: String,
    #[serde(default, deserialize_with = "float_or_none")]
    pub game_number: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePreview {
    #[serde(default, deserialize_with = "string_or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub date: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub time: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub home_team: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub away_team: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub venue: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub home_pitcher: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub away_pitcher: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub preview_link: String,
    #[serde(default, deserialize_with = "float_or_none")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub wind_gusts: Option<f64>,
    #[serde(default, deserialize_with = "string_or_default")]
    pub wind_description: String,
    #[serde(default, deserialize_with = "float_or_none")]
    pub rain_probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitcherTrend {
    #[serde(default, alias = "bbrefId", deserialize_with = "string_or_default")]
    pub pitcher: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub performance_status: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub message: Option<String>,
}

/// Season line from the pitchers-by-date collection; one row per season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitcherLine {
    #[serde(default, deserialize_with = "string_or_default")]
    pub bbref_id: String,
    #[serde(default, deserialize_with = "year_or_zero")]
    pub year: i64,
    #[serde(default, deserialize_with = "string_or_default")]
    pub throws: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub wl: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub era: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "HitterTempWire")]
pub struct HitterTemp {
    pub date: String,
    pub bbref_id: String,
    pub team: String,
    pub current_temp: Option<f64>,
    pub trailing_temps: [Option<f64>; 6],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HitterTempWire {
    #[serde(default, deserialize_with = "string_or_default")]
    date: String,
    #[serde(default, deserialize_with = "string_or_default")]
    bbref_id: String,
    #[serde(default, deserialize_with = "string_or_default")]
    team: String,
    #[serde(default, deserialize_with = "float_or_none")]
    current_temp: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    trailing_temp1: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    trailing_temp2: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    trailing_temp3: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    trailing_temp4: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    trailing_temp5: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    trailing_temp6: Option<f64>,
}

impl From<HitterTempWire> for HitterTemp {
    fn from(wire: HitterTempWire) -> Self {
        Self {
            date: wire.date,
            bbref_id: wire.bbref_id,
            team: wire.team,
            current_temp: wire.current_temp,
            trailing_temps: [
                wire.trailing_temp1,
                wire.trailing_temp2,
                wire.trailing_temp3,
                wire.trailing_temp4,
                wire.trailing_temp5,
                wire.trailing_temp6,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingGameLog {
    #[serde(default, deserialize_with = "string_or_default")]
    pub bbref_id: String,
    #[serde(default, deserialize_with = "float_or_none")]
    pub split_park_factor: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub g: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub pa: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub hr: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub ba: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub ops: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub home_games: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    pub away_games: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LineupWire")]
pub struct Lineup {
    pub team: String,
    /// Batting order slots 1 through 9; empty strings for unknown slots.
    pub batting_order: Vec<String>,
}

impl Lineup {
    pub fn is_complete(&self) -> bool {
        self.batting_order
            .first()
            .is_some_and(|lead_off| !lead_off.trim().is_empty())
    }
}

#[derive(Deserialize)]
struct LineupWire {
    #[serde(default, deserialize_with = "string_or_default")]
    team: String,
    #[serde(default, rename = "batting1st", deserialize_with = "string_or_default")]
    first: String,
    #[serde(default, rename = "batting2nd", deserialize_with = "string_or_default")]
    second: String,
    #[serde(default, rename = "batting3rd", deserialize_with = "string_or_default")]
    third: String,
    #[serde(default, rename = "batting4th", deserialize_with = "string_or_default")]
    fourth: String,
    #[serde(default, rename = "batting5th", deserialize_with = "string_or_default")]
    fifth: String,
    #[serde(default, rename = "batting6th", deserialize_with = "string_or_default")]
    sixth: String,
    #[serde(default, rename = "batting7th", deserialize_with = "string_or_default")]
    seventh: String,
    #[serde(default, rename = "batting8th", deserialize_with = "string_or_default")]
    eighth: String,
    #[serde(default, rename = "batting9th", deserialize_with = "string_or_default")]
    ninth: String,
}

impl From<LineupWire> for Lineup {
    fn from(wire: LineupWire) -> Self {
        Self {
            team: wire.team,
            batting_order: vec![
                wire.first,
                wire.second,
                wire.third,
                wire.fourth,
                wire.fifth,
                wire.sixth,
                wire.seventh,
                wire.eighth,
                wire.ninth,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfitabilityWire")]
pub struct ProfitabilityLine {
    pub player: String,
    pub stats: [Option<f64>; 4],
    pub date: String,
}

#[derive(Deserialize)]
struct ProfitabilityWire {
    #[serde(default, deserialize_with = "string_or_default")]
    player: String,
    #[serde(default, deserialize_with = "float_or_none")]
    stat1: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    stat2: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    stat3: Option<f64>,
    #[serde(default, deserialize_with = "float_or_none")]
    stat4: Option<f64>,
    #[serde(default, deserialize_with = "string_or_default")]
    date: String,
}

impl From<ProfitabilityWire> for ProfitabilityLine {
    fn from(wire: ProfitabilityWire) -> Self {
        Self {
            player: wire.player,
            stats: [wire.stat1, wire.stat2, wire.stat3, wire.stat4],
            date: wire.date,
        }
    }
}

pub fn parse_team_temps_json(raw: &str) -> Result<Vec<TeamTemp>> {
    parse_collection_json(raw)
}

pub fn parse_game_previews_json(raw: &str) -> Result<Vec<GamePreview>> {
    parse_collection_json(raw)
}

pub fn parse_pitcher_trends_json(raw: &str) -> Result<Vec<PitcherTrend>> {
    parse_collection_json(raw)
}

pub fn parse_pitcher_lines_json(raw: &str) -> Result<Vec<PitcherLine>> {
    parse_collection_json(raw)
}

pub fn parse_hitter_temps_json(raw: &str) -> Result<Vec<HitterTemp>> {
    parse_collection_json(raw)
}

pub fn parse_trailing_logs_json(raw: &str) -> Result<Vec<TrailingGameLog>> {
    parse_collection_json(raw)
}

pub fn parse_lineups_json(raw: &str) -> Result<Vec<Lineup>> {
    parse_collection_json(raw)
}

pub fn parse_profitability_json(raw: &str) -> Result<Vec<ProfitabilityLine>> {
    parse_collection_json(raw)
}

/// Collections the UI only shows key/value style (team record splits, park factors).
pub fn parse_raw_records_json(raw: &str) -> Result<Vec<RawRecord>> {
    parse_records_json(raw)
}

/// Parses `{ "id": "Full Name" }`; ids mapped to null, arrays or objects are skipped.
pub fn parse_player_names_json(raw: &str) -> Result<std::collections::HashMap<String, String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Default::default());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid player names json")?;
    let Some(map) = root.as_object() else {
        return Err(anyhow::anyhow!("player names response is not an object"));
    };
    Ok(map
        .iter()
        .filter_map(|(id, name)| as_string(name).map(|name| (id.clone(), name)))
        .collect())
}

fn parse_collection_json<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    parse_records_json(raw)?
        .into_iter()
        .map(|record| {
            serde_json::from_value(Value::Object(record)).context("unexpected record shape")
        })
        .collect()
}

fn parse_records_json(raw: &str) -> Result<Vec<RawRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid collection json")?;
    match root {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()),
        // A lone record is treated as a one-element collection.
        Value::Object(map) => Ok(vec![map]),
        _ => Err(anyhow::anyhow!("collection response is not an array")),
    }
}

fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_string(&value).unwrap_or_default())
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_string(&value))
}

fn float_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_f64(&value))
}

fn year_or_zero<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_f64(&value).map(|year| year as i64).unwrap_or(0))
}

pub fn pick_string(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(as_string)
}

pub fn pick_f64(record: &RawRecord, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|key| record.get(*key)).find_map(as_f64)
}

/// Numbers may arrive as strings. `NaN` and infinities read as missing.
fn as_f64(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    num.filter(|n| n.is_finite())
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `key: value` pairs for a raw record, ordered by field name.
pub fn raw_record_pairs(record: &RawRecord) -> Vec<(String, String)> {
    record
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Null => "-".to_string(),
                other => as_string(other).unwrap_or_else(|| other.to_string()),
            };
            (key.clone(), text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_records_json, parse_team_temps_json, parse_trailing_logs_json, pick_f64};

    #[test]
    fn numbers_may_arrive_as_strings() {
        let records = parse_records_json(r#"[{"ba": "0.287"}, {"ba": 0.301}]"#).expect("valid");
        assert_eq!(pick_f64(&records[0], &["ba"]), Some(0.287));
        assert_eq!(pick_f64(&records[1], &["ba"]), Some(0.301));
    }

    #[test]
    fn non_finite_numbers_read_as_missing() {
        let rows = parse_team_temps_json(
            r#"[{"team": "PHI", "currentTemp": "NaN", "rs": "inf"}, {"team": "NYM", "currentTemp": " 71.5 "}]"#,
        )
        .expect("valid");
        assert_eq!(rows[0].current_temp, None);
        assert_eq!(rows[0].rs, None);
        assert_eq!(rows[1].current_temp, Some(71.5));
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let logs = parse_trailing_logs_json(r#"[{"bbrefId": 17, "ops": [1], "g": true}]"#)
            .expect("valid");
        assert_eq!(logs[0].bbref_id, "17");
        assert_eq!(logs[0].ops, None);
        assert_eq!(logs[0].g, None);
    }

    #[test]
    fn null_body_is_an_empty_collection() {
        assert!(parse_records_json(" null ").expect("valid").is_empty());
    }
}
