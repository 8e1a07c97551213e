//! Page entry selection
//!
//! The build side passes a subset to the bundler through `BUILD_PAGES`
//! (comma-separated targets); the bundler side turns that value back into
//! entry documents. An unset variable means every page.

use std::collections::BTreeMap;

use crate::page::{Page, PageRequest};

pub const BUILD_PAGES_ENV: &str = "BUILD_PAGES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    /// Selected pages in request order, without duplicates
    pages: Vec<Page>,
    all: bool,
    /// Names that were skipped
    unknown: Vec<String>,
}

impl PageSelection {
    pub fn all() -> Self {
        Self {
            pages: Page::ALL.to_vec(),
            all: true,
            unknown: Vec::new(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    /// Target name → entry document
    pub fn entries(&self) -> BTreeMap<&'static str, &'static str> {
        self.pages
            .iter()
            .map(|page| (page.target(), page.entry_document()))
            .collect()
    }

    /// Value for `BUILD_PAGES`, or `None` when every page is built.
    pub fn build_pages_value(&self) -> Option<String> {
        if self.all {
            return None;
        }
        Some(
            self.pages
                .iter()
                .map(Page::target)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

pub struct PageEntrySelector;

impl PageEntrySelector {
    /// Resolve human-friendly names. Unknown names are skipped with a
    /// warning; `all`, no names, or no known names selects every page.
    pub fn select<I, S>(requested: I) -> PageSelection
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pages = Vec::new();
        let mut unknown = Vec::new();
        let mut wants_all = false;

        for name in requested {
            let name = name.as_ref();
            match name.parse::<PageRequest>() {
                Ok(PageRequest::All) => wants_all = true,
                Ok(PageRequest::Page(page)) => {
                    if !pages.contains(&page) {
                        pages.push(page);
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        page = %name,
                        available = %PageRequest::NAMES.join(", "),
                        "Unknown page"
                    );
                    unknown.push(name.to_string());
                }
            }
        }

        if wants_all || pages.is_empty() {
            return PageSelection {
                unknown,
                ..PageSelection::all()
            };
        }

        PageSelection {
            pages,
            all: false,
            unknown,
        }
    }

    /// Read a `BUILD_PAGES` value back into a selection. Unknown targets are
    /// skipped; an absent, empty or entirely unknown value selects every page.
    pub fn from_build_pages(value: Option<&str>) -> PageSelection {
        let Some(value) = value else {
            return PageSelection::all();
        };

        let mut pages = Vec::new();
        let mut unknown = Vec::new();
        for target in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match Page::from_target(target) {
                Some(page) if !pages.contains(&page) => pages.push(page),
                Some(_) => {}
                None => {
                    tracing::warn!(build_target = %target, "Unknown build target");
                    unknown.push(target.to_string());
                }
            }
        }

        if pages.is_empty() {
            return PageSelection {
                unknown,
                ..PageSelection::all()
            };
        }

        PageSelection {
            pages,
            all: false,
            unknown,
        }
    }
}
