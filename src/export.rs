//! Static export: one rendered page per directory.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::ExplorerError;
use crate::path::NavigationPath;
use crate::render::Renderer;
use crate::store::StoreConfig;
use crate::tree::TreeNode;
use crate::view::build_page;

/// Name of the page file written into every exported directory.
pub const PAGE_FILE_NAME: &str = "index.html";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// Segments that would not map onto a plain directory below the output root,
/// or would collide with the page file written next to them.
fn is_unsafe_segment(segment: &str) -> bool {
    segment.is_empty()
        || segment.eq_ignore_ascii_case(PAGE_FILE_NAME)
        || segment == "."
        || segment == ".."
        || segment.contains('\\')
        || segment.contains(':')
}

fn output_dir_for(out_dir: &Path, path: &NavigationPath) -> Option<PathBuf> {
    if path.segments().iter().any(|s| is_unsafe_segment(s)) {
        return None;
    }
    Some(path.segments().iter().fold(out_dir.to_path_buf(), |dir, s| dir.join(s)))
}

/// Renders the root page and every directory page, then writes each as
/// `<out_dir>/<directory path>/index.html`.
///
/// Rendering runs in parallel; writing is sequential. Directories whose name
/// cannot be used on disk are logged and skipped.
pub fn export_site(
    tree: &TreeNode,
    config: &StoreConfig,
    renderer: &dyn Renderer,
    out_dir: &Path,
) -> Result<ExportSummary, ExplorerError> {
    let mut paths = vec![NavigationPath::root()];
    paths.extend(
        tree.directory_paths()
            .into_iter()
            .map(NavigationPath::from_segments),
    );

    let rendered: Vec<(NavigationPath, String)> = paths
        .into_par_iter()
        .map(|path| {
            let page = build_page(Some(tree), &path, config);
            let document = renderer.render(&page);
            (path, document)
        })
        .collect();

    let mut summary = ExportSummary::default();
    for (path, document) in rendered {
        let dir = match output_dir_for(out_dir, &path) {
            Some(dir) => dir,
            None => {
                tracing::warn!(path = %path.current_path(), "Skipping directory with unusable name");
                summary.skipped += 1;
                continue;
            }
        };
        fs::create_dir_all(&dir)?;
        let file = dir.join(PAGE_FILE_NAME);
        fs::write(&file, &document)?;
        tracing::debug!(file = %file.display(), "page written");
        summary.pages += 1;
        summary.bytes += document.len() as u64;
    }
    Ok(summary)
}
