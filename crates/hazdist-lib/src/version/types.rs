use serde::{Deserialize, Serialize};

/// Body of the version endpoint. Fields other than `version` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
}
