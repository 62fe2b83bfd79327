use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Client builder with the common settings.
pub fn builder() -> ClientBuilder {
    Client::builder().timeout(TIMEOUT)
}

/// Build a default client.
pub fn try_new() -> Result<Client> {
    Ok(builder().build()?)
}
