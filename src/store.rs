//! Access to the remote key-value store.
//!
//! The store answers two requests: `GET <base>?list=1` with a JSON listing of
//! every key, and `GET <base>?file=<key>` with the raw bytes of one object.

use std::collections::HashMap;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a key the way browsers encode a URI component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE_SET).to_string()
}

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn list_url(&self) -> String {
        format!("{}?list=1", self.base_url)
    }

    pub fn file_url(&self, key: &str) -> String {
        format!("{}?file={}", self.base_url, encode_component(key))
    }
}

/// One entry of the listing. `name` is kept raw so a non-string name does not
/// fail the whole listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyEntry {
    pub name: Value,
}

impl KeyEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Value::String(name.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_str()
    }
}

/// Body of `GET ?list=1`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyListing {
    pub keys: Vec<KeyEntry>,
    #[serde(default = "default_list_complete")]
    pub list_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

fn default_list_complete() -> bool {
    true
}

impl KeyListing {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: names.into_iter().map(KeyEntry::new).collect(),
            list_complete: true,
            cursor: None,
        }
    }

    /// Names usable as keys. Entries whose name is not a string are logged and
    /// skipped.
    pub fn key_names(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter_map(|entry| match entry.name() {
                Some(name) => Some(name),
                None => {
                    tracing::error!(file_name = %entry.name, "Invalid file name");
                    None
                }
            })
            .collect()
    }
}

/// Parses a listing body.
pub fn parse_listing(body: &[u8]) -> Result<KeyListing, StoreError> {
    Ok(serde_json::from_slice(body)?)
}

/// The two operations the explorer needs from a store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetches and decodes the full key listing.
    async fn list(&self) -> Result<KeyListing, StoreError>;

    /// Fetches the raw content stored under `key`.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// URL a browser would use to load `key` directly.
    fn file_url(&self, key: &str) -> String;

    /// Fetches `key` and decodes it as text, replacing invalid UTF-8.
    async fn fetch_text(&self, key: &str) -> Result<String, StoreError> {
        let bytes = self.fetch(key).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Store reached over HTTP.
pub struct HttpStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Store for HttpStore {
    async fn list(&self) -> Result<KeyListing, StoreError> {
        let body = self.get(&self.config.list_url()).await?;
        parse_listing(&body)
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.get(&self.config.file_url(key)).await
    }

    fn file_url(&self, key: &str) -> String {
        self.config.file_url(key)
    }
}

/// Store held in memory; unknown keys answer with status 404.
///
/// Stands in for the remote endpoint wherever no network is wanted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    config: Option<StoreConfig>,
    objects: Vec<(String, Vec<u8>)>,
    index: HashMap<String, usize>,
    listing_status: Option<u16>,
    listing_limit: Option<usize>,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::default()
        }
    }

    /// Adds or replaces an object. Listing order is first-insertion order.
    pub fn insert(&mut self, key: impl Into<String>, content: impl Into<Vec<u8>>) -> &mut Self {
        let key = key.into();
        let content = content.into();
        match self.index.get(&key).copied() {
            Some(i) => self.objects[i].1 = content,
            None => {
                self.index.insert(key.clone(), self.objects.len());
                self.objects.push((key, content));
            }
        }
        self
    }

    /// Makes the listing stop after `limit` keys and report itself as partial,
    /// with the next key as its cursor.
    pub fn truncate_listing(&mut self, limit: usize) -> &mut Self {
        self.listing_limit = Some(limit);
        self
    }

    /// Makes the listing request answer with `status` instead of the keys.
    pub fn fail_listing(&mut self, status: u16) -> &mut Self {
        self.listing_status = Some(status);
        self
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list(&self) -> Result<KeyListing, StoreError> {
        if let Some(status) = self.listing_status {
            return Err(StoreError::Status(status));
        }
        let limit = self.listing_limit.unwrap_or(self.objects.len());
        let mut listing =
            KeyListing::from_names(self.objects.iter().take(limit).map(|(key, _)| key.clone()));
        if let Some((next, _)) = self.objects.get(limit) {
            listing.list_complete = false;
            listing.cursor = Some(next.clone());
        }
        Ok(listing)
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.index
            .get(key)
            .map(|&i| self.objects[i].1.clone())
            .ok_or(StoreError::Status(404))
    }

    fn file_url(&self, key: &str) -> String {
        match &self.config {
            Some(config) => config.file_url(key),
            None => format!("?file={}", encode_component(key)),
        }
    }
}

/// Retrieves the key listing, logging any failure.
///
/// `None` means "no data"; the caller never sees the error itself.
pub async fn fetch_file_list(store: &dyn Store) -> Option<KeyListing> {
    match store.list().await {
        Ok(listing) => {
            if !listing.list_complete {
                tracing::warn!(
                    keys = listing.keys.len(),
                    cursor = ?listing.cursor,
                    "Store returned a partial listing; showing what was received"
                );
            }
            Some(listing)
        }
        Err(StoreError::Status(status)) => {
            tracing::error!(status, "Error fetching file list");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Fetch error");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_component("2024/day 1/a&b.txt"), "2024%2Fday%201%2Fa%26b.txt");
        assert_eq!(encode_component("A-z_0.9!~*'()"), "A-z_0.9!~*'()");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn urls_are_built_from_the_configured_base() {
        let config = StoreConfig::new("https://store.example/");
        assert_eq!(config.list_url(), "https://store.example/?list=1");
        assert_eq!(
            config.file_url("2024/day1/summary.xlsx"),
            "https://store.example/?file=2024%2Fday1%2Fsummary.xlsx"
        );
    }

    #[test]
    fn listing_parses_with_and_without_paging_fields() {
        let listing = parse_listing(br#"{"keys":[{"name":"a.txt"},{"name":"b/c.zip"}]}"#).unwrap();
        assert_eq!(listing.key_names(), vec!["a.txt", "b/c.zip"]);
        assert!(listing.list_complete);

        let partial =
            parse_listing(br#"{"keys":[],"list_complete":false,"cursor":"abc"}"#).unwrap();
        assert!(!partial.list_complete);
        assert_eq!(partial.cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn non_string_names_are_skipped_not_fatal() {
        let listing = parse_listing(br#"{"keys":[{"name":42},{"name":"ok.csv"}]}"#).unwrap();
        assert_eq!(listing.keys.len(), 2);
        assert_eq!(listing.key_names(), vec!["ok.csv"]);
    }

    #[test]
    fn listing_without_keys_is_a_decode_error() {
        assert!(matches!(parse_listing(b"{}"), Err(StoreError::Decode(_))));
        assert!(matches!(parse_listing(b"not json"), Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn fetch_file_list_swallows_failures() {
        let mut store = MemoryStore::default();
        store.insert("a.txt", "a").fail_listing(500);
        assert!(fetch_file_list(&store).await.is_none());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn partial_listing_is_kept_and_warned_about() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut store = MemoryStore::default();
        store.insert("a.txt", "a").insert("b.txt", "b").insert("c.txt", "c");
        store.truncate_listing(2);
        let listing = fetch_file_list(&store).await.unwrap();

        assert_eq!(listing.key_names(), vec!["a.txt", "b.txt"]);
        assert!(!listing.list_complete);
        assert_eq!(listing.cursor.as_deref(), Some("c.txt"));
        let printed = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("WARN"));
        assert!(printed.contains("partial listing"));
    }

    #[tokio::test]
    async fn memory_store_serves_inserted_objects() {
        let mut store = MemoryStore::new(StoreConfig::new("https://s/"));
        store.insert("x/y.txt", "hello").insert("z.txt", "z");
        let listing = fetch_file_list(&store).await.unwrap();
        assert_eq!(listing.key_names(), vec!["x/y.txt", "z.txt"]);
        assert_eq!(store.fetch_text("x/y.txt").await.unwrap(), "hello");
        assert!(matches!(store.fetch("missing").await, Err(StoreError::Status(404))));
        assert_eq!(store.file_url("x/y.txt"), "https://s/?file=x%2Fy.txt");
    }
}
