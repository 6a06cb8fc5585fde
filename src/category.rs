//! File grouping by name pattern.
//!
//! Classification walks [`RULES`] in order and stops at the first rule that
//! matches. Names no rule claims land in [`Category::Other`]; blank names are
//! rejected and belong to no category at all.

use std::collections::BTreeMap;
use std::fmt;

/// Display groups, declared in the order they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    SummaryXlsx,
    ThermalGlideHtml,
    DownloadIgcs,
    SimplifiedSummaries,
    CondorClub,
    Images,
    Other,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 7] = [
        Category::SummaryXlsx,
        Category::ThermalGlideHtml,
        Category::DownloadIgcs,
        Category::SimplifiedSummaries,
        Category::CondorClub,
        Category::Images,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::SummaryXlsx => "Summary xlsx",
            Category::ThermalGlideHtml => "Thermal & Glide html",
            Category::DownloadIgcs => "Download IGCs",
            Category::SimplifiedSummaries => "Simplified Summaries",
            Category::CondorClub => "Condor Club",
            Category::Images => "Images",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A file name as seen by the rules: the original plus its lowercase form.
pub struct Candidate<'a> {
    pub original: &'a str,
    pub lower: String,
}

impl<'a> Candidate<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            lower: original.to_lowercase(),
        }
    }
}

pub const CONDOR_CLUB_MARKER: &str = "Competition_day_";
pub const TASK_IMAGE_SUFFIX: &str = "_task_image.jpg";
const THERMAL_GLIDE_MARKERS: [&str; 2] =
    ["summaryclimb_interactive", "groundspeed_vs_percent_time_spent"];
const SLIM_SUMMARY_MARKER: &str = "slim_summary";
const IMAGE_SUFFIXES: [&str; 3] = [".jpg", ".jpeg", ".png"];

fn is_condor_club(c: &Candidate) -> bool {
    // The marker check is case-sensitive on purpose; the suffix checks are not.
    (c.lower.ends_with(".txt") && c.original.contains(CONDOR_CLUB_MARKER))
        || c.lower.ends_with(TASK_IMAGE_SUFFIX)
}

fn is_summary_xlsx(c: &Candidate) -> bool {
    c.lower.ends_with(".xlsx")
}

fn is_thermal_glide_html(c: &Candidate) -> bool {
    c.lower.ends_with(".html") && THERMAL_GLIDE_MARKERS.iter().any(|m| c.lower.contains(m))
}

fn is_igc_archive(c: &Candidate) -> bool {
    c.lower.ends_with(".zip")
}

fn is_slim_summary(c: &Candidate) -> bool {
    c.lower.ends_with(".csv") && c.lower.contains(SLIM_SUMMARY_MARKER)
}

fn is_image(c: &Candidate) -> bool {
    IMAGE_SUFFIXES.iter().any(|suffix| c.lower.ends_with(suffix))
}

/// Ordered classification rules; the first match wins.
pub const RULES: &[(fn(&Candidate) -> bool, Category)] = &[
    (is_condor_club, Category::CondorClub),
    (is_summary_xlsx, Category::SummaryXlsx),
    (is_thermal_glide_html, Category::ThermalGlideHtml),
    (is_igc_archive, Category::DownloadIgcs),
    (is_slim_summary, Category::SimplifiedSummaries),
    (is_image, Category::Images),
];

/// True for names that cannot be classified (blank or whitespace only).
pub fn is_invalid_name(name: &str) -> bool {
    name.trim().is_empty()
}

/// Category of a single file name, or `None` when the name is invalid.
pub fn classify(name: &str) -> Option<Category> {
    if is_invalid_name(name) {
        return None;
    }
    let candidate = Candidate::new(name);
    let category = RULES
        .iter()
        .find(|(matches, _)| matches(&candidate))
        .map(|&(_, category)| category)
        .unwrap_or(Category::Other);
    Some(category)
}

/// File names per category, each list in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroups {
    groups: BTreeMap<Category, Vec<String>>,
}

impl Default for FileGroups {
    fn default() -> Self {
        Self {
            groups: Category::ALL.iter().map(|&c| (c, Vec::new())).collect(),
        }
    }
}

impl FileGroups {
    pub fn get(&self, category: Category) -> &[String] {
        self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All categories in display order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.groups.iter().map(|(&c, names)| (c, names.as_slice()))
    }

    /// Non-empty categories in display order.
    pub fn non_empty(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.iter().filter(|(_, names)| !names.is_empty())
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    fn push(&mut self, category: Category, name: &str) {
        self.groups.entry(category).or_default().push(name.to_string());
    }
}

/// Partitions file names into the fixed category set.
///
/// Invalid names are logged and left out of every group.
pub fn group_files<I, S>(file_names: I) -> FileGroups
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups = FileGroups::default();
    for name in file_names {
        let name = name.as_ref();
        match classify(name) {
            Some(category) => groups.push(category, name),
            None => tracing::error!(file_name = ?name, "Invalid file name"),
        }
    }
    groups
}
