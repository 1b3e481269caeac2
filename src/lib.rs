pub mod chart;
pub mod config;
pub mod core;
pub mod data;
pub mod debounce;
pub mod embed;
pub mod layout;
pub mod measure;
pub mod query;
pub mod scale;
pub mod svg;
pub mod tooltip;

#[cfg(target_arch = "wasm32")]
pub mod web;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    #[error("CSV could not be parsed")]
    Csv,

    #[error("CSV is missing column `{0}`")]
    MissingColumn(&'static str),

    #[error("value is not a finite number: {0:?}")]
    InvalidValue(String),

    #[error("invalid chart configuration")]
    Config,

    #[error("required element not found: {0}")]
    MissingElement(String),

    #[error("failed to fetch {0}")]
    Fetch(String),

    #[error("DOM operation failed: {0}")]
    Dom(String),
}

pub type Result<T> = std::result::Result<T, error_stack::Report<ChartError>>;

pub mod prelude {
    pub use crate::chart::*;
    pub use crate::config::*;
    pub use crate::core::*;
    pub use crate::data::*;
    pub use crate::debounce::*;
    pub use crate::embed::*;
    pub use crate::layout::*;
    pub use crate::measure::*;
    pub use crate::tooltip::*;
    pub use crate::{ChartError, Result};
}
