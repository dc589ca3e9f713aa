pub mod config;
pub mod error;
pub mod hash;
pub mod host;
pub mod manifest;
pub mod publish;
pub mod resolve;
pub mod ui;
pub mod version;

pub use error::{ManifestPublishError, Result};
