//! pagestate i18n
//!
//! - [`LocaleResolver`]: picks the active locale from the saved preference
//!   (`app-locale` in the durable area) or a default, and persists switches
//! - [`Catalog`]: per-locale nested messages with fallback and `{name}`
//!   interpolation
//! - [`I18n`]: the two wired together for one page

mod catalog;
mod error;
mod instance;
mod resolver;

pub use catalog::Catalog;
pub use error::I18nError;
pub use instance::I18n;
pub use resolver::{LocaleResolver, LocaleState, SwitchOutcome, LOCALE_KEY};

pub type Result<T> = std::result::Result<T, I18nError>;
