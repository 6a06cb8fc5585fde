//! Navigation paths and subtree resolution.

use std::borrow::Cow;

use crate::tree::{Entry, TreeNode, KEY_SEPARATOR};

/// Ordered path segments taken from the location path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationPath {
    segments: Vec<String>,
}

impl NavigationPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a location path such as `/2024/day1`.
    ///
    /// One leading slash is stripped; an empty remainder is the root. Nothing is
    /// percent-decoded and empty segments (from doubled or trailing slashes) are
    /// kept as-is.
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.strip_prefix('/').unwrap_or(location);
        if trimmed.is_empty() {
            return Self::root();
        }
        Self {
            segments: trimmed.split(KEY_SEPARATOR).map(String::from).collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path as a key prefix, without leading slash (`2024/day1`).
    pub fn current_path(&self) -> String {
        self.segments.join("/")
    }

    /// Full key of `name` inside this directory.
    pub fn child_key(&self, name: &str) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}/{}", self.current_path(), name)
        }
    }

    /// Link target for this directory (`/2024/day1`, or `/` at the root).
    pub fn href(&self) -> String {
        format!("/{}", self.current_path())
    }

    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Splits a full key into the directory it lives in and its file name.
    pub fn split_key(key: &str) -> (Self, &str) {
        match key.rsplit_once(KEY_SEPARATOR) {
            Some((dir, name)) => (Self::from_segments(dir.split(KEY_SEPARATOR)), name),
            None => (Self::root(), key),
        }
    }
}

/// Descends `tree` one segment at a time.
///
/// An unknown segment, or a file where a directory is needed, resolves to an
/// empty node.
pub fn resolve<'a>(tree: &'a TreeNode, path: &NavigationPath) -> Cow<'a, TreeNode> {
    let mut subtree = tree;
    for part in path.segments() {
        match subtree.get(part) {
            Some(Entry::Directory(node)) => subtree = node,
            Some(Entry::File) | None => {
                tracing::debug!(segment = %part, path = %path.current_path(), "nothing at path");
                return Cow::Owned(TreeNode::new());
            }
        }
    }
    Cow::Borrowed(subtree)
}
