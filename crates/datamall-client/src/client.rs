//! LTA DataMall HTTP client.

use crate::error::DatamallError;
use crate::types::BusArrival;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Public DataMall endpoint.
pub const DEFAULT_BASE_URL: &str = "http://datamall2.mytransport.sg/ltaodataservice";

/// Default retry configuration
pub const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;
const DEFAULT_MAX_BACKOFF_MS: u64 = 5000;

/// DataMall client.
///
/// The account key is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output.
#[derive(Clone)]
pub struct DatamallClient {
    client: Client,
    base_url: String,
    account_key: SecretString,
}

impl DatamallClient {
    /// Create a new DataMall client.
    pub fn new(
        account_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DatamallError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_key: SecretString::new(account_key.into()),
        })
    }

    /// Fetch arrival estimates for a bus stop.
    #[instrument(skip(self))]
    pub async fn get_bus_arrival(&self, bus_stop_code: &str) -> Result<BusArrival, DatamallError> {
        let response = self
            .client
            .get(format!("{}/BusArrivalv2", self.base_url))
            .query(&[("BusStopCode", bus_stop_code)])
            .header("AccountKey", self.account_key.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Fetch arrivals with automatic retry and exponential backoff.
    ///
    /// Does not retry when the account key is rejected.
    #[instrument(skip(self))]
    pub async fn get_bus_arrival_with_retry(
        &self,
        bus_stop_code: &str,
        max_retries: Option<u32>,
    ) -> Result<BusArrival, DatamallError> {
        let max_retries = max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        let mut backoff_ms = DEFAULT_INITIAL_BACKOFF_MS;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                debug!("Retry attempt {} after {}ms backoff", attempt, backoff_ms);
                sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms = (backoff_ms * 2).min(DEFAULT_MAX_BACKOFF_MS);
            }

            match self.get_bus_arrival(bus_stop_code).await {
                Ok(arrival) => return Ok(arrival),
                Err(DatamallError::Unauthorized) => return Err(DatamallError::Unauthorized),
                Err(e) => {
                    warn!("Bus arrival request failed (attempt {}): {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(DatamallError::Api {
            status: 0,
            message: "Max retries exceeded".into(),
        }))
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, DatamallError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!("Response body: {}", body.chars().take(200).collect::<String>());
            serde_json::from_str(&body).map_err(DatamallError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    async fn extract_error(&self, response: reqwest::Response) -> DatamallError {
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                DatamallError::RateLimit
            }
            StatusCode::UNAUTHORIZED => {
                warn!("Account key rejected");
                DatamallError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                DatamallError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}
