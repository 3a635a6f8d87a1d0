use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config::Settings;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client; the first caller's settings decide timeout and TLS leniency.
pub fn http_client(settings: &Settings) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .context("failed to build http client")
    })
}
