//! Bot context shared by every handler.

use crate::config::BotConfig;
use crate::format;
use anyhow::Context;
use async_trait::async_trait;
use bus_stop_store::{BusStopStore, NearbyStop, DEFAULT_COMPLETION_LIMIT};
use chrono::{DateTime, Utc};
use datamall_client::{BusArrival, DatamallClient, DatamallError};
use std::sync::Arc;
use telegram_client::{
    InlineQueryAnswer, Location, OutgoingTextMessage, TelegramClient, TelegramError, Update,
};
use tracing::{debug, warn};

/// Source of bus arrival estimates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EtaProvider: Send + Sync {
    async fn bus_arrival(&self, bus_stop_code: &str) -> Result<BusArrival, DatamallError>;
}

/// DataMall-backed provider that retries transient failures.
pub struct DatamallEtas {
    client: DatamallClient,
    max_retries: u32,
}

impl DatamallEtas {
    pub fn new(client: DatamallClient, max_retries: u32) -> Self {
        Self {
            client,
            max_retries,
        }
    }
}

#[async_trait]
impl EtaProvider for DatamallEtas {
    async fn bus_arrival(&self, bus_stop_code: &str) -> Result<BusArrival, DatamallError> {
        self.client
            .get_bus_arrival_with_retry(bus_stop_code, Some(self.max_retries))
            .await
    }
}

/// Tunables taken from [`BotConfig`].
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub nearby_radius: f64,
    pub nearby_limit: usize,
    pub inline_cache_time: u32,
    pub completion_limit: usize,
    pub feedback_url: Option<String>,
}

impl From<&BotConfig> for BotSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            nearby_radius: config.nearby_radius,
            nearby_limit: config.nearby_limit,
            inline_cache_time: config.inline_cache_time,
            completion_limit: DEFAULT_COMPLETION_LIMIT,
            feedback_url: config.feedback_url.clone(),
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self::from(&BotConfig::default())
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Collaborators injected into the dispatcher.
pub struct BusEtaBot {
    pub telegram: TelegramClient,
    pub bus_stops: BusStopStore,
    pub settings: BotSettings,
    etas: Arc<dyn EtaProvider>,
    clock: Clock,
}

impl BusEtaBot {
    pub fn new(
        telegram: TelegramClient,
        etas: Arc<dyn EtaProvider>,
        bus_stops: BusStopStore,
        settings: BotSettings,
    ) -> Self {
        Self {
            telegram,
            bus_stops,
            settings,
            etas,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock, for deterministic timestamps.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Render the ETA message text for a stop.
    ///
    /// DataMall error statuses are reported in the message body. Transport
    /// failures are returned as errors.
    pub async fn eta_text(&self, bus_stop: &str, services: &[String]) -> anyhow::Result<String> {
        let stop = self.bus_stops.get(bus_stop);
        let now = self.now();

        let body = match self.etas.bus_arrival(bus_stop).await {
            Ok(arrival) if stop.is_none() && arrival.services.is_empty() => format::no_etas(),
            Ok(arrival) => format::eta_summary(&arrival, services, now),
            Err(DatamallError::Api { status, .. }) => format::datamall_down(status),
            Err(DatamallError::RateLimit) => format::datamall_down(429),
            Err(DatamallError::Unauthorized) => format::datamall_down(401),
            Err(e) => return Err(e).context("error getting etas from datamall"),
        };

        Ok(format::eta_text(&format::header(bus_stop, stop), &body, now))
    }

    /// ETA message for a chat, with Refresh and Resend buttons.
    pub async fn eta_message(
        &self,
        bus_stop: &str,
        services: &[String],
    ) -> anyhow::Result<OutgoingTextMessage> {
        self.render_eta_message(bus_stop, services, true).await
    }

    /// ETA message for an inline message, which only gets a Refresh button.
    pub async fn inline_eta_message(
        &self,
        bus_stop: &str,
        services: &[String],
    ) -> anyhow::Result<OutgoingTextMessage> {
        self.render_eta_message(bus_stop, services, false).await
    }

    async fn render_eta_message(
        &self,
        bus_stop: &str,
        services: &[String],
        resend: bool,
    ) -> anyhow::Result<OutgoingTextMessage> {
        let text = self.eta_text(bus_stop, services).await?;
        let markup = format::eta_markup(bus_stop, services, resend)?;

        Ok(OutgoingTextMessage::new(text)
            .markdown()
            .reply_markup(markup))
    }

    /// Tell the user that handling `update` failed.
    ///
    /// Messages get a reply in their chat and callback queries an alert.
    /// Inline queries and chosen results have nowhere to reply to.
    pub async fn report_failure(&self, update: &Update) {
        let text = format::something_went_wrong(update.update_id);

        let result = if let Some(message) = &update.message {
            self.telegram
                .send_message(message.chat.id, &OutgoingTextMessage::new(text))
                .await
                .map(|_| ())
        } else if let Some(query) = &update.callback_query {
            self.telegram.alert_callback_query(&query.id, &text).await
        } else {
            return;
        };

        if let Err(e) = result {
            warn!(update_id = update.update_id, "Failed to report error to user: {}", e);
        }
    }

    pub fn nearby(&self, location: Location, limit: usize) -> Vec<NearbyStop> {
        self.bus_stops.nearby(
            location.latitude,
            location.longitude,
            self.settings.nearby_radius,
            limit,
        )
    }

    /// Build the answer for an inline query, `None` when nothing matches.
    ///
    /// An empty query with a location lists nearby stops and is not cached.
    /// Anything else is answered from the stop directory.
    pub fn inline_query_answer(
        &self,
        query: &str,
        location: Option<Location>,
    ) -> anyhow::Result<Option<InlineQueryAnswer>> {
        let limit = self.settings.completion_limit;

        let (stops, cache_time, is_personal) = match location {
            Some(location) if query.trim().is_empty() => {
                let nearby = self.nearby(location, limit);
                if nearby.is_empty() {
                    debug!("No stops near inline query location");
                    (self.bus_stops.completions(query, limit), 0, None)
                } else {
                    let stops = nearby
                        .iter()
                        .filter_map(|n| self.bus_stops.get(&n.stop.code))
                        .collect();
                    (stops, 0, Some(true))
                }
            }
            _ => (
                self.bus_stops.completions(query, limit),
                self.settings.inline_cache_time,
                None,
            ),
        };

        if stops.is_empty() {
            return Ok(None);
        }

        let results = stops
            .into_iter()
            .map(format::inline_result)
            .collect::<serde_json::Result<Vec<_>>>()?;

        Ok(Some(InlineQueryAnswer {
            results,
            cache_time: Some(cache_time),
            is_personal,
            next_offset: Some(String::new()),
        }))
    }
}

/// Telegram rejects edits that leave a message unchanged. A refresh within
/// the same minute does exactly that.
pub fn is_not_modified(err: &TelegramError) -> bool {
    matches!(
        err,
        TelegramError::Api { description, .. } if description.contains("message is not modified")
    )
}
