use async_trait::async_trait;
use reqwest::{
    Client,
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Deserialize;

use crate::{
    api::client,
    prelude::*,
    sensor::{SensorSink, SensorState},
};

pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    /// Build a client for the REST API at `base_url`, for example `http://localhost:8123/api`.
    pub fn try_new(access_token: &str, base_url: Url) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .context("invalid access token")?;
        authorization.set_sensitive(true);
        let headers = HeaderMap::from_iter([(AUTHORIZATION, authorization)]);
        let client = client::builder().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check that the API is running and the token is accepted.
    #[instrument(skip_all, fields(base_url = %self.base_url))]
    pub async fn check(&self) -> Result<String> {
        let status: ApiStatus = self
            .client
            .get(self.url([""])?)
            .send()
            .await
            .context("failed to call Home Assistant")?
            .error_for_status()
            .context("Home Assistant rejected the request")?
            .json()
            .await
            .context("failed to deserialize the response")?;
        Ok(status.message)
    }

    #[instrument(skip_all, fields(entity_id = entity_id, state = %state.state))]
    pub async fn set_state(&self, entity_id: &str, state: &SensorState) -> Result {
        self.client
            .post(self.url(["states", entity_id])?)
            .json(state)
            .send()
            .await
            .with_context(|| format!("failed to update `{entity_id}`"))?
            .error_for_status()
            .with_context(|| format!("Home Assistant rejected `{entity_id}`"))?;
        debug!("updated");
        Ok(())
    }
}

#[async_trait]
impl SensorSink for Api {
    async fn publish(&self, entity_id: &str, state: &SensorState) -> Result {
        self.set_state(entity_id, state).await
    }
}

#[derive(Deserialize)]
struct ApiStatus {
    message: String,
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;
    use crate::{
        core::{component::Component, day::Day},
        sensor::{Sensor, SensorSet},
    };

    #[tokio::test]
    async fn test_check_ok() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "API running."}"#)
            .create_async()
            .await;
        let api = Api::try_new("secret", format!("{}/api", server.url()).parse()?)?;
        assert_eq!(api.check().await?, "API running.");
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_check_unauthorized() -> Result {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", "/api/").with_status(401).create_async().await;
        let api = Api::try_new("wrong", format!("{}/api/", server.url()).parse()?)?;
        assert!(api.check().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_state_ok() -> Result {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/states/sensor.better_gas_next_total_price")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({
                "state": "unavailable",
                "attributes": {
                    "friendly_name": "Better Gas Next Total Price",
                    "unit_of_measurement": "€/m³",
                },
            })))
            .with_status(201)
            .create_async()
            .await;
        let api = Api::try_new("secret", format!("{}/api", server.url()).parse()?)?;
        let sensors = SensorSet::builder().entity_prefix("better_gas").name_prefix("Better Gas").build();
        let sensor = Sensor { day: Day::Next, component: Component::Total };
        api.publish(&sensors.entity_id(sensor), &sensors.unavailable(sensor)).await?;
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_set_state_rejected() -> Result {
        let mut server = Server::new_async().await;
        let _mock = server.mock("POST", "/api/states/sensor.x").with_status(400).create_async().await;
        let api = Api::try_new("secret", format!("{}/api", server.url()).parse()?)?;
        let sensors = SensorSet::builder().entity_prefix("x").name_prefix("X").build();
        let sensor = Sensor { day: Day::Current, component: Component::MarketPrice };
        assert!(api.set_state("sensor.x", &sensors.unavailable(sensor)).await.is_err());
        Ok(())
    }
}
