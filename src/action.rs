//! What happens when a file item is clicked.
//!
//! Each [`Action`] runs as its own fetch-then-show sequence against a [`Store`]
//! and a [`Browser`]. Failures are logged and turned into an
//! [`ActionOutcome::Failed`]; nothing is retried and nothing propagates.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use human_bytes::human_bytes;

use crate::error::StoreError;
use crate::store::{Store, StoreConfig};

/// Text put in the content area when a file cannot be shown.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading file.";

const NEW_TAB_SUFFIXES: [&str; 1] = [".html"];
const DOWNLOAD_SUFFIXES: [&str; 3] = [".csv", ".xlsx", ".zip"];

/// Behaviour attached to a file link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Fetch the file, read its text as a URL and navigate there.
    FollowLink { key: String, url: String },
    /// Open the file URL in a new tab without fetching it.
    OpenInNewTab { url: String },
    /// Fetch the bytes and save them under `file_name`.
    Download {
        key: String,
        url: String,
        file_name: String,
    },
    /// Fetch the text and show it in the content area.
    ShowText { key: String, url: String },
}

impl Action {
    /// The extension-based action every plain file link gets.
    pub fn for_file(key: &str, file_name: &str, config: &StoreConfig) -> Self {
        let lower = file_name.to_lowercase();
        let url = config.file_url(key);
        if NEW_TAB_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            Action::OpenInNewTab { url }
        } else if DOWNLOAD_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            Action::Download {
                key: key.to_string(),
                url,
                file_name: file_name.to_string(),
            }
        } else {
            Action::ShowText {
                key: key.to_string(),
                url,
            }
        }
    }

    pub fn follow_link(key: &str, config: &StoreConfig) -> Self {
        Action::FollowLink {
            key: key.to_string(),
            url: config.file_url(key),
        }
    }

    /// Short machine-readable name, used as the `data-action` attribute.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::FollowLink { .. } => "follow-link",
            Action::OpenInNewTab { .. } => "open-tab",
            Action::Download { .. } => "download",
            Action::ShowText { .. } => "show-text",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Action::FollowLink { url, .. }
            | Action::OpenInNewTab { url }
            | Action::Download { url, .. }
            | Action::ShowText { url, .. } => url,
        }
    }
}

/// Effects an action can have on whatever plays the browser.
pub trait Browser {
    fn navigate(&mut self, url: &str);
    fn open_tab(&mut self, url: &str);
    /// Saves `content` as `file_name`. Any transient resource used for the
    /// transfer is released before returning.
    fn download(&mut self, file_name: &str, content: &[u8]) -> io::Result<()>;
    fn show_content(&mut self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Navigated(String),
    OpenedTab(String),
    Downloaded { file_name: String, bytes: usize },
    Displayed { bytes: usize },
    /// Images have no click behaviour; they are shown inline at this URL.
    InlineImage(String),
    Failed,
}

fn log_fetch_error(context: &str, err: &StoreError) {
    match err {
        StoreError::Status(status) => tracing::error!(status = *status, "{}", context),
        other => tracing::error!(error = %other, "Fetch error"),
    }
}

/// Runs `action`, logging failures instead of returning them.
pub async fn perform(store: &dyn Store, browser: &mut dyn Browser, action: &Action) -> ActionOutcome {
    match action {
        Action::FollowLink { key, .. } => match store.fetch_text(key).await {
            Ok(text) => {
                let target = text.trim();
                browser.navigate(target);
                ActionOutcome::Navigated(target.to_string())
            }
            Err(e) => {
                log_fetch_error("Error fetching text file", &e);
                ActionOutcome::Failed
            }
        },
        Action::OpenInNewTab { url } => {
            browser.open_tab(url);
            ActionOutcome::OpenedTab(url.clone())
        }
        Action::Download { key, file_name, .. } => match store.fetch(key).await {
            Ok(bytes) => match browser.download(file_name, &bytes) {
                Ok(()) => ActionOutcome::Downloaded {
                    file_name: file_name.clone(),
                    bytes: bytes.len(),
                },
                Err(e) => {
                    tracing::error!(%file_name, error = %e, "Error saving download");
                    ActionOutcome::Failed
                }
            },
            Err(e) => {
                log_fetch_error("Error downloading file", &e);
                ActionOutcome::Failed
            }
        },
        Action::ShowText { key, .. } => match store.fetch_text(key).await {
            Ok(text) => {
                browser.show_content(&text);
                ActionOutcome::Displayed { bytes: text.len() }
            }
            Err(e) => {
                log_fetch_error("Error loading file", &e);
                browser.show_content(LOAD_ERROR_MESSAGE);
                ActionOutcome::Failed
            }
        },
    }
}

/// Browser stand-in for a terminal: messages and file content go to `out`,
/// downloads land in `download_dir`.
pub struct LocalBrowser<W: Write> {
    download_dir: PathBuf,
    out: W,
}

impl<W: Write> LocalBrowser<W> {
    pub fn new(download_dir: impl Into<PathBuf>, out: W) -> Self {
        Self {
            download_dir: download_dir.into(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn say(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            tracing::warn!(error = %e, "could not write browser output");
        }
    }
}

impl<W: Write> Browser for LocalBrowser<W> {
    fn navigate(&mut self, url: &str) {
        self.say(&format!("Navigate to: {}", url));
    }

    fn open_tab(&mut self, url: &str) {
        self.say(&format!("Open in new tab: {}", url));
    }

    fn download(&mut self, file_name: &str, content: &[u8]) -> io::Result<()> {
        // Only the last path component is honoured so a name can't climb out.
        let safe_name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty file name"))?;
        fs::create_dir_all(&self.download_dir)?;
        let mut staged = tempfile::NamedTempFile::new_in(&self.download_dir)?;
        staged.write_all(content)?;
        let target = self.download_dir.join(safe_name);
        staged.persist(&target).map_err(|e| e.error)?;
        self.say(&format!(
            "Saved {} ({})",
            target.display(),
            human_bytes(content.len() as f64)
        ));
        Ok(())
    }

    fn show_content(&mut self, text: &str) {
        self.say(text);
    }
}

/// Browser that only remembers what it was asked to do.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingBrowser {
    pub navigations: Vec<String>,
    pub tabs: Vec<String>,
    pub downloads: Vec<(String, Vec<u8>)>,
    pub content: Option<String>,
}

impl Browser for RecordingBrowser {
    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }

    fn open_tab(&mut self, url: &str) {
        self.tabs.push(url.to_string());
    }

    fn download(&mut self, file_name: &str, content: &[u8]) -> io::Result<()> {
        self.downloads.push((file_name.to_string(), content.to_vec()));
        Ok(())
    }

    fn show_content(&mut self, text: &str) {
        self.content = Some(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config() -> StoreConfig {
        StoreConfig::new("https://store.example/")
    }

    #[test]
    fn default_action_branches_on_extension() {
        let c = config();
        assert!(matches!(
            Action::for_file("d/report.HTML", "report.HTML", &c),
            Action::OpenInNewTab { .. }
        ));
        for name in ["a.csv", "b.XLSX", "c.zip"] {
            let action = Action::for_file(name, name, &c);
            assert_eq!(action.kind(), "download");
        }
        let action = Action::for_file("d/notes.txt", "notes.txt", &c);
        assert_eq!(
            action,
            Action::ShowText {
                key: "d/notes.txt".to_string(),
                url: "https://store.example/?file=d%2Fnotes.txt".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn follow_link_navigates_to_trimmed_file_text() {
        let mut store = MemoryStore::new(config());
        store.insert("Competition_day_1.txt", "https://condor.club/results/1\n");
        let mut browser = RecordingBrowser::default();
        let action = Action::follow_link("Competition_day_1.txt", &config());
        let outcome = perform(&store, &mut browser, &action).await;
        assert_eq!(
            outcome,
            ActionOutcome::Navigated("https://condor.club/results/1".to_string())
        );
        assert_eq!(browser.navigations, vec!["https://condor.club/results/1"]);
    }

    #[tokio::test]
    async fn failed_follow_link_stays_put() {
        let store = MemoryStore::new(config());
        let mut browser = RecordingBrowser::default();
        let action = Action::follow_link("missing.txt", &config());
        assert_eq!(perform(&store, &mut browser, &action).await, ActionOutcome::Failed);
        assert!(browser.navigations.is_empty());
        assert!(browser.content.is_none());
    }

    #[tokio::test]
    async fn open_in_new_tab_does_not_fetch() {
        let store = MemoryStore::new(config());
        let mut browser = RecordingBrowser::default();
        let action = Action::for_file("x.html", "x.html", &config());
        let outcome = perform(&store, &mut browser, &action).await;
        assert_eq!(
            outcome,
            ActionOutcome::OpenedTab("https://store.example/?file=x.html".to_string())
        );
        assert_eq!(browser.tabs.len(), 1);
    }

    #[tokio::test]
    async fn download_keeps_original_name() {
        let mut store = MemoryStore::new(config());
        store.insert("2024/day1/summary.xlsx", vec![1u8, 2, 3]);
        let mut browser = RecordingBrowser::default();
        let action = Action::for_file("2024/day1/summary.xlsx", "summary.xlsx", &config());
        let outcome = perform(&store, &mut browser, &action).await;
        assert_eq!(
            outcome,
            ActionOutcome::Downloaded {
                file_name: "summary.xlsx".to_string(),
                bytes: 3
            }
        );
        assert_eq!(browser.downloads, vec![("summary.xlsx".to_string(), vec![1, 2, 3])]);
    }

    #[tokio::test]
    async fn failed_download_fetch_saves_nothing() {
        let store = MemoryStore::new(config());
        let mut browser = RecordingBrowser::default();
        let action = Action::for_file("2024/day1/summary.xlsx", "summary.xlsx", &config());
        assert_eq!(perform(&store, &mut browser, &action).await, ActionOutcome::Failed);
        assert!(browser.downloads.is_empty());
        assert!(browser.content.is_none());
    }

    #[tokio::test]
    async fn download_that_cannot_be_saved_fails() {
        let mut store = MemoryStore::new(config());
        store.insert("results.zip", vec![1u8, 2]);
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let mut browser = LocalBrowser::new(blocker.join("dl"), Vec::new());
        let action = Action::for_file("results.zip", "results.zip", &config());
        assert_eq!(perform(&store, &mut browser, &action).await, ActionOutcome::Failed);
        assert!(!String::from_utf8(browser.into_inner()).unwrap().contains("Saved"));
    }

    #[tokio::test]
    async fn failed_show_text_puts_error_message_in_content_area() {
        let store = MemoryStore::new(config());
        let mut browser = RecordingBrowser::default();
        let action = Action::for_file("gone.log", "gone.log", &config());
        assert_eq!(perform(&store, &mut browser, &action).await, ActionOutcome::Failed);
        assert_eq!(browser.content.as_deref(), Some(LOAD_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn show_text_displays_content() {
        let mut store = MemoryStore::new(config());
        store.insert("notes.txt", "line one");
        let mut browser = RecordingBrowser::default();
        let action = Action::for_file("notes.txt", "notes.txt", &config());
        assert_eq!(
            perform(&store, &mut browser, &action).await,
            ActionOutcome::Displayed { bytes: 8 }
        );
        assert_eq!(browser.content.as_deref(), Some("line one"));
    }

    #[test]
    fn local_browser_writes_downloads_and_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut browser = LocalBrowser::new(dir.path().join("dl"), Vec::new());
        browser.download("../escape/summary.xlsx", b"data").unwrap();
        browser.navigate("https://example.org");
        let saved = std::fs::read(dir.path().join("dl").join("summary.xlsx")).unwrap();
        assert_eq!(saved, b"data");
        let leftovers = std::fs::read_dir(dir.path().join("dl")).unwrap().count();
        assert_eq!(leftovers, 1);
        let printed = String::from_utf8(browser.into_inner()).unwrap();
        assert!(printed.contains("Saved"));
        assert!(printed.contains("Navigate to: https://example.org"));
    }
}
