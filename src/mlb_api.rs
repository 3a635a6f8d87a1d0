use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::config::Settings;
use crate::http_cache::{fetch_json, fetch_json_cached, post_json};
use crate::http_client::http_client;
use crate::records::{
    self, GamePreview, HitterTemp, Lineup, PitcherLine, PitcherTrend, ProfitabilityLine, RawRecord,
    TeamTemp, TrailingGameLog,
};

/// Blocking client for the stats service collections.
#[derive(Clone)]
pub struct MlbApi {
    base: String,
    use_cache: bool,
    client: &'static Client,
}

impl MlbApi {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            base: settings.api_base.trim_end_matches('/').to_string(),
            use_cache: settings.http_cache,
            client: http_client(settings)?,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn team_temps(&self, season: i32) -> Result<Vec<TeamTemp>> {
        let body = self.get(&format!("TeamTemperatureTracking/latest-teams/{season}/true"))?;
        records::parse_team_temps_json(&body).context("team temperatures")
    }

    pub fn team_temp_series(&self, team: &str, season: i32) -> Result<Vec<TeamTemp>> {
        let body = self.get(&format!("TeamTemperatureTracking/{}/{season}", team.trim()))?;
        records::parse_team_temps_json(&body).context("team temperature series")
    }

    pub fn game_previews(&self, date: NaiveDate) -> Result<Vec<GamePreview>> {
        let body = self.get(&format!("GamePreviews/{}", short_date(date)))?;
        records::parse_game_previews_json(&body).context("game previews")
    }

    pub fn pitcher_trends(&self, date: NaiveDate) -> Result<Vec<PitcherTrend>> {
        let body = self.get(&format!(
            "Blending/todaysSPHistoryVsRecency?date={}",
            iso_date(date)
        ))?;
        records::parse_pitcher_trends_json(&body).context("pitcher trends")
    }

    pub fn pitcher_lines(&self, date: NaiveDate) -> Result<Vec<PitcherLine>> {
        let body = self.get(&format!("Pitchers/pitchersByDate/{}", short_date(date)))?;
        records::parse_pitcher_lines_json(&body).context("pitcher lines")
    }

    /// Batch name lookup. Callers pass deduplicated ids; an empty batch skips the request.
    pub fn player_names(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let url = self.url("mlbplayer/batch");
        let body = post_json(self.client, &url, ids).context("player name batch failed")?;
        records::parse_player_names_json(&body)
    }

    pub fn hitter_temps(&self, date: NaiveDate) -> Result<Vec<HitterTemp>> {
        let body = self.get(&format!(
            "HitterTempTracking/last7Days?targetDate={}",
            iso_date(date)
        ))?;
        records::parse_hitter_temps_json(&body).context("hitter temperatures")
    }

    pub fn trailing_logs(&self) -> Result<Vec<TrailingGameLog>> {
        let body = self.get("TrailingGameLogSplits/last7G")?;
        records::parse_trailing_logs_json(&body).context("trailing game logs")
    }

    pub fn team_records(&self) -> Result<Vec<RawRecord>> {
        let body = self.get("TeamRecSplits")?;
        records::parse_raw_records_json(&body).context("team record splits")
    }

    pub fn park_factors(&self) -> Result<Vec<RawRecord>> {
        let body = self.get("ParkFactors")?;
        records::parse_raw_records_json(&body).context("park factors")
    }

    pub fn actual_lineups(&self, date: NaiveDate) -> Result<Vec<Lineup>> {
        let body = self.get(&format!("Lineups/Actual/{}", iso_date(date)))?;
        records::parse_lineups_json(&body).context("actual lineups")
    }

    pub fn predicted_lineups(&self, date: NaiveDate) -> Result<Vec<Lineup>> {
        let body = self.get(&format!("Lineups/Predictions/date/{}", iso_date(date)))?;
        records::parse_lineups_json(&body).context("predicted lineups")
    }

    pub fn profitability(&self) -> Result<Vec<ProfitabilityLine>> {
        let body = self.get("PlayerStats")?;
        records::parse_profitability_json(&body).context("team profitability")
    }

    fn get(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        let body = if self.use_cache {
            fetch_json_cached(self.client, &url)
        } else {
            fetch_json(self.client, &url)
        };
        body.with_context(|| format!("GET {url}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

/// `YY-MM-DD`, the key format of the preview and pitcher collections.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%y-%m-%d").to_string()
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
