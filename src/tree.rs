//! Hierarchical view of the flat key listing.
//!
//! Keys are split on `/`; every segment but the last becomes a directory node,
//! the last becomes a file leaf. Entries remember the order in which their name
//! was first seen, which is the order every view presents them in.
//! Numeric-looking names such as `2024` get no special placement: they are not
//! hoisted ahead of other names or sorted numerically.

use std::collections::HashMap;

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '/';

/// A directory: named entries in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    entries: Vec<(String, Entry)>,
    index: HashMap<String, usize>,
}

/// What a segment name points at inside a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Directory(TreeNode),
    File,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File)
    }

    pub fn as_directory(&self) -> Option<&TreeNode> {
        match self {
            Entry::Directory(node) => Some(node),
            Entry::File => None,
        }
    }
}

impl TreeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Entries in first-insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Marks `name` as a file, replacing whatever was there before.
    pub fn insert_file(&mut self, name: &str) {
        self.set(name, Entry::File);
    }

    /// Returns the directory stored under `name`, creating an empty one when the
    /// name is unknown or currently a file.
    pub fn directory_mut(&mut self, name: &str) -> &mut TreeNode {
        let position = match self.index.get(name).copied() {
            Some(i) => {
                if self.entries[i].1.is_file() {
                    self.entries[i].1 = Entry::Directory(TreeNode::new());
                }
                i
            }
            None => self.push(name, Entry::Directory(TreeNode::new())),
        };
        match &mut self.entries[position].1 {
            Entry::Directory(node) => node,
            Entry::File => unreachable!("entry was just made a directory"),
        }
    }

    fn set(&mut self, name: &str, entry: Entry) {
        match self.index.get(name).copied() {
            Some(i) => self.entries[i].1 = entry,
            None => {
                self.push(name, entry);
            }
        }
    }

    fn push(&mut self, name: &str, entry: Entry) -> usize {
        let position = self.entries.len();
        self.entries.push((name.to_string(), entry));
        self.index.insert(name.to_string(), position);
        position
    }

    /// True when no entry is a directory. An empty node counts as all leaves.
    pub fn is_all_leaves(&self) -> bool {
        self.entries.iter().all(|(_, entry)| entry.is_file())
    }

    /// Names of the direct file entries, in order.
    pub fn leaf_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_file())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Full slash-joined paths of every file below this node, depth-first.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_leaf_paths(&mut Vec::new(), &mut paths);
        paths
    }

    fn collect_leaf_paths<'a>(&'a self, prefix: &mut Vec<&'a str>, out: &mut Vec<String>) {
        for (name, entry) in &self.entries {
            prefix.push(name);
            match entry {
                Entry::File => out.push(prefix.join("/")),
                Entry::Directory(node) => node.collect_leaf_paths(prefix, out),
            }
            prefix.pop();
        }
    }

    /// Segment paths of every directory below this node, parents before children.
    pub fn directory_paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        self.collect_directory_paths(&mut Vec::new(), &mut paths);
        paths
    }

    fn collect_directory_paths(&self, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        for (name, entry) in &self.entries {
            if let Entry::Directory(node) = entry {
                prefix.push(name.clone());
                out.push(prefix.clone());
                node.collect_directory_paths(prefix, out);
                prefix.pop();
            }
        }
    }
}

/// Builds the full hierarchy from the flat key names.
///
/// A segment used as a file by one key and as a directory by another ends up as
/// whatever the later key made it; its position does not move.
pub fn build_file_tree<I, S>(keys: I) -> TreeNode
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tree = TreeNode::new();
    for key in keys {
        let parts: Vec<&str> = key.as_ref().split(KEY_SEPARATOR).collect();
        let (last, dirs) = match parts.split_last() {
            Some(split) => split,
            None => continue,
        };
        let mut current = &mut tree;
        for part in dirs {
            current = current.directory_mut(part);
        }
        current.insert_file(last);
    }
    tracing::debug!(top_level_entries = tree.len(), "built file tree");
    tree
}
