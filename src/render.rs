//! Output formats for a [`Page`].

use clap::ValueEnum;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::action::{Action, LOAD_ERROR_MESSAGE};
use crate::view::{Item, Listing, Page, BREADCRUMB_SEPARATOR, IMAGE_MAX_WIDTH_PX, NO_FILES_MESSAGE};

/// Icon representing a folder in text output.
const FOLDER_ICON: &str = "📁";
/// Icon representing a file in text output.
const FILE_ICON: &str = "📄";
/// Icon representing an inline image in text output.
const IMAGE_ICON: &str = "🖼️";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum PageFormat {
    Html,
    Text,
}

impl PageFormat {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            PageFormat::Html => Box::new(HtmlRenderer::default()),
            PageFormat::Text => Box::new(TextRenderer),
        }
    }
}

/// Turns a page into a complete document.
pub trait Renderer: Send + Sync {
    fn render(&self, page: &Page) -> String;
}

/// A standalone HTML document with `navigation`, `file-list` and
/// `file-content` regions.
///
/// Links carry their action in `data-action` (plus `data-key`), with `href`,
/// `target` and `download` set so the page stays usable without scripting.
/// An inline script ([`CLICK_SCRIPT`]) intercepts clicks on those links and
/// runs the action in the page itself.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    pub title: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            title: "Competition Results".to_string(),
        }
    }
}

/// Click handling for `a[data-action]` links inside `#file-list`.
///
/// `LOAD_ERROR_MESSAGE` is declared ahead of it by the renderer.
pub const CLICK_SCRIPT: &str = r#"document.getElementById('file-list').addEventListener('click', async (event) => {
  const link = event.target.closest('a[data-action]');
  if (!link) return;
  event.preventDefault();
  const url = link.href;
  const content = document.getElementById('file-content');
  switch (link.dataset.action) {
    case 'open-tab':
      window.open(url, '_blank');
      break;
    case 'follow-link':
      try {
        const response = await fetch(url);
        if (response.ok) {
          window.location.href = (await response.text()).trim();
        } else {
          console.error('Error fetching text file:', response.status);
        }
      } catch (err) {
        console.error('Fetch error:', err);
      }
      break;
    case 'download':
      try {
        const response = await fetch(url);
        if (response.ok) {
          const objectUrl = URL.createObjectURL(await response.blob());
          const a = document.createElement('a');
          a.href = objectUrl;
          a.download = link.getAttribute('download');
          document.body.appendChild(a);
          a.click();
          a.remove();
          URL.revokeObjectURL(objectUrl);
        } else {
          console.error('Error downloading file:', response.status);
        }
      } catch (err) {
        console.error('Fetch error:', err);
      }
      break;
    case 'show-text':
      try {
        const response = await fetch(url);
        content.innerText = response.ok ? await response.text() : LOAD_ERROR_MESSAGE;
      } catch (err) {
        console.error('Fetch error:', err);
        content.innerText = LOAD_ERROR_MESSAGE;
      }
      break;
  }
});"#;

fn anchor(href: &str, label: &str) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        encode_double_quoted_attribute(href),
        encode_text(label)
    )
}

fn action_anchor(label: &str, action: &Action) -> String {
    let mut attrs = format!(
        r#"href="{}" data-action="{}""#,
        encode_double_quoted_attribute(action.url()),
        action.kind()
    );
    match action {
        Action::FollowLink { key, .. } | Action::ShowText { key, .. } => {
            attrs.push_str(&format!(r#" data-key="{}""#, encode_double_quoted_attribute(key)));
        }
        Action::OpenInNewTab { .. } => attrs.push_str(r#" target="_blank""#),
        Action::Download { key, file_name, .. } => {
            attrs.push_str(&format!(
                r#" data-key="{}" download="{}""#,
                encode_double_quoted_attribute(key),
                encode_double_quoted_attribute(file_name)
            ));
        }
    }
    format!("<a {}>{}</a>", attrs, encode_text(label))
}

fn item_html(item: &Item) -> String {
    let inner = match item {
        Item::Link { label, action } => action_anchor(label, action),
        Item::Image { src, alt } => format!(
            r#"<img src="{}" alt="{}" style="max-width: {}px">"#,
            encode_double_quoted_attribute(src),
            encode_double_quoted_attribute(alt),
            IMAGE_MAX_WIDTH_PX
        ),
        Item::Folder { label, href } => anchor(href, label),
    };
    format!("<li>{}</li>", inner)
}

impl HtmlRenderer {
    fn document_title(&self, page: &Page) -> String {
        if page.path.is_root() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, page.path.current_path())
        }
    }

    fn navigation(&self, page: &Page) -> String {
        page.breadcrumbs
            .iter()
            .map(|crumb| anchor(&crumb.href, &crumb.label))
            .collect::<Vec<_>>()
            .join(BREADCRUMB_SEPARATOR)
    }

    fn file_list(&self, page: &Page) -> String {
        match &page.listing {
            Listing::Unavailable => format!("<li>{}</li>", NO_FILES_MESSAGE),
            Listing::Directory(items) => items.iter().map(item_html).collect::<Vec<_>>().join("\n"),
            Listing::Grouped(sections) => sections
                .iter()
                .map(|section| {
                    let items: Vec<String> = section.items.iter().map(item_html).collect();
                    format!(
                        "<li class=\"group\"><h3>{}</h3>\n<ul>\n{}\n</ul></li>",
                        encode_text(section.category.label()),
                        items.join("\n")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, page: &Page) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav id="navigation">{navigation}</nav>
<ul id="file-list">
{file_list}
</ul>
<pre id="file-content"></pre>
<script>
const LOAD_ERROR_MESSAGE = "{load_error}";
{script}
</script>
</body>
</html>
"#,
            title = encode_text(&self.document_title(page)),
            navigation = self.navigation(page),
            file_list = self.file_list(page),
            load_error = LOAD_ERROR_MESSAGE,
            script = CLICK_SCRIPT,
        )
    }
}

/// Plain terminal listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

fn item_line(item: &Item) -> String {
    match item {
        Item::Link { label, action } => {
            format!("  {} {} [{}] {}", FILE_ICON, label, action.kind(), action.url())
        }
        Item::Image { src, alt } => format!("  {} {} {}", IMAGE_ICON, alt, src),
        Item::Folder { label, href } => format!("  {} {} {}", FOLDER_ICON, label, href),
    }
}

impl Renderer for TextRenderer {
    fn render(&self, page: &Page) -> String {
        let mut lines = vec![page
            .breadcrumbs
            .iter()
            .map(|crumb| crumb.label.as_str())
            .collect::<Vec<_>>()
            .join(BREADCRUMB_SEPARATOR)];
        lines.push(String::new());
        match &page.listing {
            Listing::Unavailable => lines.push(NO_FILES_MESSAGE.to_string()),
            Listing::Directory(items) => lines.extend(items.iter().map(item_line)),
            Listing::Grouped(sections) => {
                for section in sections {
                    lines.push(section.category.label().to_string());
                    lines.extend(section.items.iter().map(item_line));
                }
            }
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
