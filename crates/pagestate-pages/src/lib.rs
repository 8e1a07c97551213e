//! pagestate Pages
//!
//! Page name resolution for builds:
//! - `login` → login page
//! - `user-center`, `userCenter`, `user` → user-center page
//! - `all` (or nothing) → every page
//!
//! Unknown names are warned about and skipped. When no known page remains,
//! every page is built.

mod error;
mod page;
mod selector;

pub use error::PagesError;
pub use page::{Page, PageRequest};
pub use selector::{PageEntrySelector, PageSelection, BUILD_PAGES_ENV};

pub type Result<T> = std::result::Result<T, PagesError>;
