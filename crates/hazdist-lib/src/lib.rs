pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod progress;
pub mod verification;
pub mod version;

pub use config::Config;
pub use error::HazDistError;
