use crate::error::HazDistError;
use reqwest::Client;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds the client shared by the resolver and the downloader. Timeouts are
/// applied per request since the two steps use different budgets.
pub fn build_client() -> Result<Client, HazDistError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(HazDistError::HttpClient)
}
