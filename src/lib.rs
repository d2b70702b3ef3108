#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod gateway;
pub mod line;
pub mod product;
pub mod rakuten;
pub(crate) mod utils;

/// Re-exports for fuzz targets. Not part of the public API.
#[doc(hidden)]
pub mod fuzz_api {
    pub use crate::line::events::decode;
    pub use crate::line::signature::verify;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
