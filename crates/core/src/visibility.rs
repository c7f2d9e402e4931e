//! Page/section/element visibility tree.
//!
//! The admin console toggles what the public site renders at three levels.
//! Lookups return the most specific boolean set along a path and fall back
//! to the parent level, then to visible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Visibility of elements within one section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionVisibility {
    /// Section toggle; unset falls back to the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Element toggles by element name.
    #[serde(default)]
    pub elements: BTreeMap<String, bool>,
}

/// Visibility of one page and its sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVisibility {
    /// Page toggle; unset means visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Sections by section name.
    #[serde(default)]
    pub sections: BTreeMap<String, SectionVisibility>,
}

/// The whole visibility tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Pages by page name.
    #[serde(default)]
    pub pages: BTreeMap<String, PageVisibility>,
}

/// Pages, their sections and the elements of each section in the default tree.
const DEFAULT_TREE: &[(&str, &[(&str, &[&str])])] = &[
    (
        "home",
        &[
            ("hero", &["title", "tagline", "cta"]),
            ("latestRelease", &["cover", "player"]),
            ("upcomingShows", &["list", "viewAll"]),
            ("newsletter", &["form"]),
        ],
    ),
    ("shows", &[("upcoming", &["tickets"]), ("past", &["setlists"])]),
    ("music", &[("releases", &["lyrics", "credits"]), ("player", &[])]),
    ("store", &[("products", &["price", "stock"]), ("cart", &[])]),
    ("about", &[("bio", &[]), ("members", &["photos"]), ("press", &[])]),
    ("media", &[("photos", &[]), ("videos", &[]), ("flyers", &[])]),
];

impl Default for VisibilityConfig {
    fn default() -> Self {
        let pages = DEFAULT_TREE
            .iter()
            .map(|(page, sections)| {
                let sections = sections
                    .iter()
                    .map(|(section, elements)| {
                        let section_vis = SectionVisibility {
                            visible: Some(true),
                            elements: elements.iter().map(|e| ((*e).to_string(), true)).collect(),
                        };
                        ((*section).to_string(), section_vis)
                    })
                    .collect();
                let page_vis = PageVisibility {
                    visible: Some(true),
                    sections,
                };
                ((*page).to_string(), page_vis)
            })
            .collect();

        Self { pages }
    }
}

impl VisibilityConfig {
    /// Serialize the tree to JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Coerce arbitrary JSON into the tree shape.
    ///
    /// Accepts either `{"pages": {...}}` or a bare map of pages. Boolean
    /// leaves are kept, `"true"`/`"false"` strings and `0`/`1` numbers are
    /// converted, and anything else is dropped so the level falls back to
    /// its parent. Never fails.
    #[must_use]
    pub fn coerce(value: &Value) -> Self {
        let pages = value
            .get("pages")
            .and_then(Value::as_object)
            .or_else(|| value.as_object());

        let pages = pages
            .map(|pages| {
                pages
                    .iter()
                    .filter_map(|(name, page)| Some((name.clone(), coerce_page(page.as_object()?))))
                    .collect()
            })
            .unwrap_or_default();

        Self { pages }
    }

    /// Apply a partial update page by page.
    ///
    /// `patch` is coerced like [`VisibilityConfig::coerce`], so it may be
    /// `{"pages": {...}}` or a bare page map. Each page it names replaces
    /// the stored page; other pages are kept.
    #[must_use]
    pub fn merge_pages(mut self, patch: &Value) -> Self {
        self.pages.extend(Self::coerce(patch).pages);
        self
    }

    /// Resolve a `page[.section[.element]]` path.
    #[must_use]
    pub fn is_visible(&self, path: &str) -> bool {
        get_config_value(self, path)
    }
}

fn coerce_page(page: &Map<String, Value>) -> PageVisibility {
    let sections = page
        .get("sections")
        .and_then(Value::as_object)
        .map(|sections| {
            sections
                .iter()
                .filter_map(|(name, section)| {
                    Some((name.clone(), coerce_section(section.as_object()?)))
                })
                .collect()
        })
        .unwrap_or_default();

    PageVisibility {
        visible: page.get("visible").and_then(coerce_bool),
        sections,
    }
}

fn coerce_section(section: &Map<String, Value>) -> SectionVisibility {
    let elements = section
        .get("elements")
        .and_then(Value::as_object)
        .map(|elements| {
            elements
                .iter()
                .filter_map(|(name, leaf)| Some((name.clone(), coerce_bool(leaf)?)))
                .collect()
        })
        .unwrap_or_default();

    SectionVisibility {
        visible: section.get("visible").and_then(coerce_bool),
        elements,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Whether the element, section or page addressed by `path` is visible.
///
/// Walks page → section → element and returns the most specific boolean
/// found. Unset levels fall back to their parent, and a path with nothing
/// set anywhere is visible.
///
/// ```rust
/// use backline_core::visibility::{get_config_value, VisibilityConfig};
/// use serde_json::json;
///
/// let config = VisibilityConfig::coerce(&json!({
///     "pages": {"store": {"visible": false, "sections": {"cart": {"visible": true}}}}
/// }));
/// assert!(!get_config_value(&config, "store"));
/// assert!(!get_config_value(&config, "store.products"));
/// assert!(get_config_value(&config, "store.cart"));
/// assert!(get_config_value(&config, "unknown.page"));
/// ```
#[must_use]
pub fn get_config_value(config: &VisibilityConfig, path: &str) -> bool {
    let mut segments = path.split('.');
    let mut resolved = true;

    let Some(page) = segments.next().and_then(|p| config.pages.get(p)) else {
        return resolved;
    };
    if let Some(v) = page.visible {
        resolved = v;
    }

    let Some(section) = segments.next().and_then(|s| page.sections.get(s)) else {
        return resolved;
    };
    if let Some(v) = section.visible {
        resolved = v;
    }

    segments
        .next()
        .and_then(|e| section.elements.get(e).copied())
        .unwrap_or(resolved)
}
