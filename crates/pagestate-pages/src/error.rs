//! Page selection error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PagesError {
    #[error("Unknown page: {0}")]
    UnknownPage(String),
}
