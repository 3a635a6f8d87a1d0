pub mod config;
pub mod derive;
pub mod feed;
pub mod games;
pub mod hitter_temps;
pub mod http_cache;
pub mod http_client;
pub mod join;
pub mod keys;
pub mod mlb_api;
pub mod pitcher_metrics;
pub mod profitability;
pub mod records;
pub mod series;
pub mod state;
pub mod table_view;
pub mod team_temps;
