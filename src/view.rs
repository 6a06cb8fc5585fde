//! Renderer-independent page model.
//!
//! A [`Page`] is everything the explorer shows for one location: breadcrumbs
//! and either a grouped listing (the directory holds only files) or a plain
//! directory listing. Building one is pure; turning it into output is the job
//! of a [`crate::render::Renderer`].

use crate::action::Action;
use crate::category::{classify, group_files, Category};
use crate::path::{resolve, NavigationPath};
use crate::store::StoreConfig;
use crate::tree::{Entry, TreeNode};

pub const HOME_LABEL: &str = "Home";
pub const BREADCRUMB_SEPARATOR: &str = " / ";
pub const RACE_RESULTS_LABEL: &str = "Race Results";
pub const NO_FILES_MESSAGE: &str = "No files found.";
pub const IMAGE_MAX_WIDTH_PX: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub href: String,
}

/// One line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A link whose click runs `action`.
    Link { label: String, action: Action },
    /// An image shown inline.
    Image { src: String, alt: String },
    /// A plain link to a nested directory page.
    Folder { label: String, href: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub category: Category,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The key listing could not be fetched.
    Unavailable,
    Grouped(Vec<Section>),
    Directory(Vec<Item>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub path: NavigationPath,
    pub breadcrumbs: Vec<Crumb>,
    pub listing: Listing,
}

/// `Home` followed by one crumb per segment, each pointing at the cumulative path.
pub fn breadcrumbs(path: &NavigationPath) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb {
        label: HOME_LABEL.to_string(),
        href: "/".to_string(),
    }];
    let mut so_far = NavigationPath::root();
    for segment in path.segments() {
        so_far = so_far.join(segment);
        crumbs.push(Crumb {
            label: segment.clone(),
            href: so_far.href(),
        });
    }
    crumbs
}

/// Item for a file shown in a category section.
fn grouped_item(category: Category, name: &str, path: &NavigationPath, config: &StoreConfig) -> Item {
    let key = path.child_key(name);
    let lower = name.to_lowercase();
    match category {
        Category::CondorClub if lower.ends_with(".txt") => Item::Link {
            label: RACE_RESULTS_LABEL.to_string(),
            action: Action::follow_link(&key, config),
        },
        Category::CondorClub | Category::Images => Item::Image {
            src: config.file_url(&key),
            alt: name.to_string(),
        },
        _ => Item::Link {
            label: name.to_string(),
            action: Action::for_file(&key, name, config),
        },
    }
}

/// Sections for a directory that holds only files, skipping empty categories.
pub fn grouped_sections<S: AsRef<str>>(
    file_names: &[S],
    path: &NavigationPath,
    config: &StoreConfig,
) -> Vec<Section> {
    group_files(file_names)
        .non_empty()
        .map(|(category, names)| Section {
            category,
            items: names
                .iter()
                .map(|name| grouped_item(category, name, path, config))
                .collect(),
        })
        .collect()
}

/// One item per entry, in entry order.
pub fn directory_items(subtree: &TreeNode, path: &NavigationPath, config: &StoreConfig) -> Vec<Item> {
    subtree
        .entries()
        .map(|(name, entry)| match entry {
            Entry::File => Item::Link {
                label: name.to_string(),
                action: Action::for_file(&path.child_key(name), name, config),
            },
            Entry::Directory(_) => Item::Folder {
                label: name.to_string(),
                href: path.join(name).href(),
            },
        })
        .collect()
}

/// Grouped when every entry is a file (an empty directory included), plain otherwise.
pub fn listing_for(subtree: &TreeNode, path: &NavigationPath, config: &StoreConfig) -> Listing {
    if subtree.is_all_leaves() {
        Listing::Grouped(grouped_sections(&subtree.leaf_names(), path, config))
    } else {
        Listing::Directory(directory_items(subtree, path, config))
    }
}

/// The page for `path`; `tree` is `None` when the listing was unavailable.
pub fn build_page(tree: Option<&TreeNode>, path: &NavigationPath, config: &StoreConfig) -> Page {
    let listing = match tree {
        Some(tree) => {
            let subtree = resolve(tree, path);
            tracing::debug!(
                path = %path.current_path(),
                entries = subtree.len(),
                "resolved subtree"
            );
            listing_for(&subtree, path, config)
        }
        None => Listing::Unavailable,
    };
    Page {
        path: path.clone(),
        breadcrumbs: breadcrumbs(path),
        listing,
    }
}

/// The item a page shows for the file stored under `key`, or `None` when the
/// key is not a file in `tree`.
pub fn item_for_key(tree: &TreeNode, key: &str, config: &StoreConfig) -> Option<Item> {
    let (dir, name) = NavigationPath::split_key(key);
    let parent = resolve(tree, &dir);
    if !parent.get(name).map_or(false, Entry::is_file) {
        return None;
    }
    let item = if parent.is_all_leaves() {
        let category = classify(name)?;
        grouped_item(category, name, &dir, config)
    } else {
        Item::Link {
            label: name.to_string(),
            action: Action::for_file(key, name, config),
        }
    };
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_file_tree;

    fn config() -> StoreConfig {
        StoreConfig::new("https://store.example/")
    }

    fn sample_tree() -> TreeNode {
        build_file_tree([
            "2024/day1/summary.xlsx",
            "2024/day1/photo.jpg",
            "2024/day2/results.zip",
        ])
    }

    #[test]
    fn breadcrumbs_point_at_cumulative_paths() {
        let crumbs = breadcrumbs(&NavigationPath::from_segments(["2024", "day1"]));
        let pairs: Vec<(&str, &str)> = crumbs
            .iter()
            .map(|c| (c.label.as_str(), c.href.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("Home", "/"), ("2024", "/2024"), ("day1", "/2024/day1")]
        );
    }

    #[test]
    fn root_breadcrumbs_are_just_home() {
        assert_eq!(breadcrumbs(&NavigationPath::root()).len(), 1);
    }

    #[test]
    fn leaf_only_directory_renders_grouped() {
        let tree = sample_tree();
        let path = NavigationPath::from_segments(["2024", "day1"]);
        let page = build_page(Some(&tree), &path, &config());
        let sections = match page.listing {
            Listing::Grouped(sections) => sections,
            other => panic!("expected grouped listing, got {:?}", other),
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, Category::SummaryXlsx);
        assert_eq!(
            sections[0].items,
            vec![Item::Link {
                label: "summary.xlsx".to_string(),
                action: Action::Download {
                    key: "2024/day1/summary.xlsx".to_string(),
                    url: "https://store.example/?file=2024%2Fday1%2Fsummary.xlsx".to_string(),
                    file_name: "summary.xlsx".to_string(),
                },
            }]
        );
        assert_eq!(sections[1].category, Category::Images);
        assert_eq!(
            sections[1].items,
            vec![Item::Image {
                src: "https://store.example/?file=2024%2Fday1%2Fphoto.jpg".to_string(),
                alt: "photo.jpg".to_string(),
            }]
        );
    }

    #[test]
    fn directories_render_as_plain_folder_links() {
        let tree = sample_tree();
        let path = NavigationPath::from_segments(["2024"]);
        let page = build_page(Some(&tree), &path, &config());
        assert_eq!(
            page.listing,
            Listing::Directory(vec![
                Item::Folder {
                    label: "day1".to_string(),
                    href: "/2024/day1".to_string()
                },
                Item::Folder {
                    label: "day2".to_string(),
                    href: "/2024/day2".to_string()
                },
            ])
        );
    }

    #[test]
    fn mixed_directory_gives_files_the_default_action() {
        let tree = build_file_tree(["top/readme.md", "top/sub/a.txt", "top/page.html"]);
        let items = directory_items(
            &resolve(&tree, &NavigationPath::from_segments(["top"])),
            &NavigationPath::from_segments(["top"]),
            &config(),
        );
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], Item::Link { action: Action::ShowText { .. }, .. }));
        assert!(matches!(&items[1], Item::Folder { href, .. } if href == "/top/sub"));
        assert!(matches!(&items[2], Item::Link { action: Action::OpenInNewTab { .. }, .. }));
    }

    #[test]
    fn condor_club_items() {
        let sections = grouped_sections(
            &["Competition_day_3.txt", "day3_task_image.jpg"],
            &NavigationPath::root(),
            &config(),
        );
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category, Category::CondorClub);
        assert!(matches!(
            &sections[0].items[0],
            Item::Link { label, action: Action::FollowLink { .. } } if label == RACE_RESULTS_LABEL
        ));
        assert!(matches!(&sections[0].items[1], Item::Image { alt, .. } if alt == "day3_task_image.jpg"));
    }

    #[test]
    fn unknown_path_renders_an_empty_grouped_listing() {
        let page = build_page(Some(&sample_tree()), &NavigationPath::from_location("/nope"), &config());
        assert_eq!(page.listing, Listing::Grouped(Vec::new()));
    }

    #[test]
    fn missing_tree_is_unavailable() {
        let page = build_page(None, &NavigationPath::root(), &config());
        assert_eq!(page.listing, Listing::Unavailable);
        assert_eq!(page.breadcrumbs.len(), 1);
    }

    #[test]
    fn item_for_key_follows_the_parent_view() {
        let tree = build_file_tree(["a/Competition_day_1.txt", "b/Competition_day_1.txt", "b/c/x.txt"]);
        assert!(matches!(
            item_for_key(&tree, "a/Competition_day_1.txt", &config()),
            Some(Item::Link { action: Action::FollowLink { .. }, .. })
        ));
        assert!(matches!(
            item_for_key(&tree, "b/Competition_day_1.txt", &config()),
            Some(Item::Link { action: Action::ShowText { .. }, .. })
        ));
        assert_eq!(item_for_key(&tree, "b/c", &config()), None);
        assert_eq!(item_for_key(&tree, "nope.txt", &config()), None);
    }
}
