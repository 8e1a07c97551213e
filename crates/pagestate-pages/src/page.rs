//! Pages and the names they can be requested by

use serde::{Deserialize, Serialize};

use crate::error::PagesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Page {
    Login,
    UserCenter,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Login, Page::UserCenter];

    /// Build target name, as passed to the bundler
    pub fn target(&self) -> &'static str {
        match self {
            Page::Login => "login",
            Page::UserCenter => "userCenter",
        }
    }

    /// HTML entry document for the page
    pub fn entry_document(&self) -> &'static str {
        match self {
            Page::Login => "login.html",
            Page::UserCenter => "user-center.html",
        }
    }

    pub fn from_target(target: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|page| page.target() == target)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.target())
    }
}

/// A name given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    All,
    Page(Page),
}

impl PageRequest {
    /// Every accepted name except `all`, for help and warnings
    pub const NAMES: [&'static str; 4] = ["login", "user-center", "userCenter", "user"];
}

impl std::str::FromStr for PageRequest {
    type Err = PagesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(PageRequest::All),
            "login" => Ok(PageRequest::Page(Page::Login)),
            "user-center" | "userCenter" | "user" => Ok(PageRequest::Page(Page::UserCenter)),
            other => Err(PagesError::UnknownPage(other.to_string())),
        }
    }
}
