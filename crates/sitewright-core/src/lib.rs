pub mod artifact;
pub mod assemble;
pub mod blocks;
pub mod config;
pub mod deploy;
pub mod error;
pub mod orchestrator;
pub mod profile;
pub mod registry;
pub mod seo;
pub mod templates;
pub mod types;

pub use error::{Result, SiteError};
