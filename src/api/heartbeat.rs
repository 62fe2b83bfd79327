use std::time::Duration;

use reqwest::{Client, Url};

use crate::prelude::*;

/// Optional dead man's switch, pinged after every successful poll.
#[derive(Clone, Default)]
pub struct Heartbeat {
    url: Option<Url>,
    client: Client,
}

impl Heartbeat {
    pub fn new(url: Option<Url>) -> Self {
        Self { url, client: Client::new() }
    }

    /// Send the heartbeat, if configured. Failures are only logged.
    #[instrument(skip_all)]
    pub async fn send(&self) {
        let Some(url) = &self.url else {
            return;
        };
        debug!(%url, "sending a heartbeat…");
        let result = self
            .client
            .post(url.clone())
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);
        if let Err(error) = result {
            warn!("failed to send the heartbeat: {error:#}");
        }
    }
}
