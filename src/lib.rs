//! condorview: browse competition result files kept behind a key-value
//! retrieval endpoint.
//!
//! The store only knows flat keys such as `2024/day1/summary.xlsx`. This crate
//! rebuilds the folder hierarchy from them, groups the files of a folder into
//! display categories and renders pages whose links download, open or preview
//! those files.

pub mod action;
pub mod category;
pub mod error;
pub mod export;
pub mod logging;
pub mod path;
pub mod render;
pub mod store;
pub mod tree;
pub mod view;

pub use action::{perform, Action, ActionOutcome, Browser, LocalBrowser, RecordingBrowser};
pub use category::{classify, group_files, Category, FileGroups};
pub use error::{ExplorerError, StoreError};
pub use export::{export_site, ExportSummary};
pub use path::{resolve, NavigationPath};
pub use render::{HtmlRenderer, PageFormat, Renderer, TextRenderer};
pub use store::{fetch_file_list, HttpStore, KeyListing, MemoryStore, Store, StoreConfig};
pub use tree::{build_file_tree, Entry, TreeNode};
pub use view::{build_page, item_for_key, Item, Listing, Page};

/// A store plus the configuration its links are built from.
pub struct Explorer<S: Store> {
    store: S,
    config: StoreConfig,
}

impl<S: Store> Explorer<S> {
    pub fn new(store: S, config: StoreConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Fetches the listing and builds the full tree; `None` when the listing is
    /// unavailable.
    pub async fn load_tree(&self) -> Option<TreeNode> {
        let listing = fetch_file_list(&self.store).await?;
        let names = listing.key_names();
        tracing::info!(keys = names.len(), "fetched key listing");
        Some(build_file_tree(names))
    }

    /// Everything shown for `location` (a location path such as `/2024/day1`).
    pub async fn load_page(&self, location: &str) -> Page {
        let tree = self.load_tree().await;
        let path = NavigationPath::from_location(location);
        tracing::debug!(segments = ?path.segments(), "current path");
        build_page(tree.as_ref(), &path, &self.config)
    }

    /// Does what clicking `key` on its folder page does.
    pub async fn open(&self, key: &str, browser: &mut dyn Browser) -> ActionOutcome {
        let tree = match self.load_tree().await {
            Some(tree) => tree,
            None => return ActionOutcome::Failed,
        };
        match item_for_key(&tree, key, &self.config) {
            Some(Item::Link { action, .. }) => perform(&self.store, browser, &action).await,
            Some(Item::Image { src, .. }) => ActionOutcome::InlineImage(src),
            Some(Item::Folder { .. }) | None => {
                tracing::error!(%key, "No such file in listing");
                ActionOutcome::Failed
            }
        }
    }
}

impl Explorer<HttpStore> {
    /// Explorer talking to the store at `config.base_url`.
    pub fn http(config: StoreConfig) -> Self {
        Self::new(HttpStore::new(config.clone()), config)
    }
}
