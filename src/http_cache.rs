use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{
    ACCEPT, ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use serde::{Deserialize, Serialize};

const STORE_VERSION: u32 = 2;
const MAX_ENTRIES: usize = 256;

static STORE: Mutex<Option<CacheStore>> = Mutex::new(None);

/// What the server sent to let a later GET be answered with 304.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Validators {
    etag: Option<String>,
    last_modified: Option<String>,
}

impl Validators {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let validators = Self {
            etag: read(ETAG),
            last_modified: read(LAST_MODIFIED),
        };
        (validators.etag.is_some() || validators.last_modified.is_some()).then_some(validators)
    }

    fn attach(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(etag) = &self.etag {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = &self.last_modified {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
        req
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedBody {
    body: String,
    validators: Validators,
    stored_at: u64,
}

/// Collection bodies keyed by URL, persisted as one JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheStore {
    version: u32,
    bodies: HashMap<String, CachedBody>,
}

impl CacheStore {
    /// An unreadable or outdated file starts an empty store.
    fn open(path: Option<&Path>) -> Self {
        path.and_then(|path| fs::read_to_string(path).ok())
            .and_then(|raw| serde_json::from_str::<Self>(&raw).ok())
            .filter(|store| store.version == STORE_VERSION)
            .unwrap_or_default()
    }

    fn insert(&mut self, url: &str, cached: CachedBody) {
        self.bodies.insert(url.to_string(), cached);
        while self.bodies.len() > MAX_ENTRIES {
            let Some(oldest) = self
                .bodies
                .iter()
                .min_by_key(|(_, cached)| cached.stored_at)
                .map(|(url, _)| url.clone())
            else {
                break;
            };
            self.bodies.remove(&oldest);
        }
    }

    fn persist(&mut self, path: &Path) -> Result<()> {
        self.version = STORE_VERSION;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("create http cache dir")?;
        }
        let staged = path.with_extension("json.tmp");
        let json = serde_json::to_vec(self).context("serialize http cache")?;
        fs::write(&staged, json).context("write http cache")?;
        fs::rename(&staged, path).context("swap http cache")?;
        Ok(())
    }
}

enum Reply {
    Body {
        text: String,
        validators: Option<Validators>,
    },
    NotModified,
}

impl Reply {
    fn into_body(self) -> Result<String> {
        match self {
            Reply::Body { text, .. } => Ok(text),
            Reply::NotModified => Err(anyhow!("received 304 for an unconditional request")),
        }
    }
}

fn send(req: RequestBuilder) -> Result<Reply> {
    let resp = req
        .header(ACCEPT, "application/json")
        .send()
        .context("request failed")?;
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        return Ok(Reply::NotModified);
    }
    let validators = Validators::from_headers(resp.headers());
    let text = resp.text().context("failed reading body")?;
    if !status.is_success() {
        bail!("http {status}: {text}");
    }
    Ok(Reply::Body { text, validators })
}

/// Plain GET, bypassing the cache.
pub fn fetch_json(client: &Client, url: &str) -> Result<String> {
    send(client.get(url))?.into_body()
}

/// POST a JSON body and return the response text. Never cached.
pub fn post_json<T: Serialize + ?Sized>(client: &Client, url: &str, body: &T) -> Result<String> {
    send(client.post(url).json(body))?.into_body()
}

/// GET that revalidates a previously stored body. Only bodies that came with an
/// ETag or Last-Modified are stored.
pub fn fetch_json_cached(client: &Client, url: &str) -> Result<String> {
    let previous = with_store(|store| store.bodies.get(url).cloned());
    let req = match &previous {
        Some(cached) => cached.validators.attach(client.get(url)),
        None => client.get(url),
    };

    match send(req)? {
        Reply::NotModified => {
            let mut cached = previous.context("received 304 without a cached body")?;
            cached.stored_at = now_secs();
            let body = cached.body.clone();
            remember(url, cached);
            Ok(body)
        }
        Reply::Body { text, validators } => {
            if let Some(validators) = validators {
                remember(
                    url,
                    CachedBody {
                        body: text.clone(),
                        validators,
                        stored_at: now_secs(),
                    },
                );
            }
            Ok(text)
        }
    }
}

fn with_store<T>(f: impl FnOnce(&mut CacheStore) -> T) -> T {
    let mut guard = STORE.lock().expect("http cache lock poisoned");
    let store = guard.get_or_insert_with(|| CacheStore::open(store_path().as_deref()));
    f(store)
}

fn remember(url: &str, cached: CachedBody) {
    with_store(|store| {
        store.insert(url, cached);
        if let Some(path) = store_path() {
            let _ = store.persist(&path);
        }
    });
}

fn store_path() -> Option<PathBuf> {
    let non_blank = |key: &str| env::var(key).ok().filter(|val| !val.trim().is_empty());
    let root = non_blank("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| non_blank("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    Some(root.join("mlb_terminal").join("http_cache.json"))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn cached(stored_at: u64) -> CachedBody {
        CachedBody {
            body: format!("[{stored_at}]"),
            validators: Validators {
                etag: Some(format!("\"v{stored_at}\"")),
                last_modified: None,
            },
            stored_at,
        }
    }

    #[test]
    fn insert_evicts_the_oldest_bodies() {
        let mut store = CacheStore::default();
        for i in 0..(MAX_ENTRIES + 2) {
            store.insert(&format!("u{i}"), cached(i as u64));
        }
        assert_eq!(store.bodies.len(), MAX_ENTRIES);
        assert!(!store.bodies.contains_key("u0"));
        assert!(!store.bodies.contains_key("u1"));
        assert!(store.bodies.contains_key("u2"));
    }

    #[test]
    fn responses_without_validators_are_not_cacheable() {
        let mut headers = HeaderMap::new();
        assert_eq!(Validators::from_headers(&headers), None);

        headers.insert(LAST_MODIFIED, HeaderValue::from_static("Sun, 29 Sep 2024 12:00:00 GMT"));
        let validators = Validators::from_headers(&headers).expect("last-modified is a validator");
        assert_eq!(validators.etag, None);
        assert_eq!(
            validators.last_modified.as_deref(),
            Some("Sun, 29 Sep 2024 12:00:00 GMT")
        );
    }

    #[test]
    fn persisted_store_reopens_and_old_versions_are_dropped() {
        let dir = env::temp_dir().join(format!("mlb_terminal_cache_{}", std::process::id()));
        let path = dir.join("http_cache.json");

        let mut store = CacheStore::default();
        store.insert("https://api.test/GamePreviews/24-09-29", cached(7));
        store.persist(&path).expect("store should persist");

        let reopened = CacheStore::open(Some(&path));
        let body = reopened
            .bodies
            .get("https://api.test/GamePreviews/24-09-29")
            .expect("body survives a reopen");
        assert_eq!(body.body, "[7]");

        fs::write(&path, r#"{"version": 1, "bodies": {}}"#).expect("overwrite cache file");
        assert!(CacheStore::open(Some(&path)).bodies.is_empty());
        assert!(CacheStore::open(None).bodies.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
