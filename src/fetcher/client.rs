use crate::config::FetchConfig;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client for one fetch session
///
/// A fresh client is built per fetch so every page gets an isolated session
/// (new connection pool, no carried cookies), which keeps the traffic
/// pattern closer to independent visits and reduces ban risk. The cost of
/// re-establishing connections is accepted deliberately.
///
/// # Arguments
///
/// * `config` - Fetch configuration (user agent, timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}
