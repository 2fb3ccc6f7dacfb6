mod resolver;
mod types;

pub use resolver::resolve_version;
pub use types::VersionInfo;
