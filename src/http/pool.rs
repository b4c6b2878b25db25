use reqwest::Client;

use crate::config::HttpSettings;
use crate::error::Result;

pub fn create_http_client(settings: &HttpSettings) -> Result<Client> {
    let client = Client::builder()
        .https_only(settings.https_only)
        .pool_idle_timeout(settings.pool_idle_timeout())
        .pool_max_idle_per_host(10)
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .build()?;

    Ok(client)
}
