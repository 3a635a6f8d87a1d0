use std::env;

use chrono::{Local, NaiveDate};

pub const DEFAULT_API_BASE: &str = "https://localhost:44346/api";
pub const DEFAULT_SEASON: i32 = 2024;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base: String,
    pub timeout_secs: u64,
    pub accept_invalid_certs: bool,
    pub http_cache: bool,
    pub season: i32,
    pub date: NaiveDate,
    pub fetch_parallelism: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 10,
            accept_invalid_certs: true,
            http_cache: true,
            season: DEFAULT_SEASON,
            date: Local::now().date_naive(),
            fetch_parallelism: 6,
        }
    }
}

impl Settings {
    /// Reads `MLB_*` variables; anything missing or malformed keeps its default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_base = env::var("MLB_API_BASE")
            .ok()
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.api_base);
        let timeout_secs = env::var("MLB_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs)
            .clamp(2, 120);
        let accept_invalid_certs = env_flag("MLB_ACCEPT_INVALID_CERTS", defaults.accept_invalid_certs);
        let http_cache = env_flag("MLB_HTTP_CACHE", defaults.http_cache);
        let season = env::var("MLB_SEASON")
            .ok()
            .and_then(|val| val.trim().parse::<i32>().ok())
            .unwrap_or(defaults.season);
        let date = env::var("MLB_DATE")
            .ok()
            .and_then(|val| parse_date(&val))
            .unwrap_or(defaults.date);
        let fetch_parallelism = env::var("FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.fetch_parallelism)
            .clamp(2, 32);
        Self {
            api_base,
            timeout_secs,
            accept_invalid_certs,
            http_cache,
            season,
            date,
            fetch_parallelism,
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
