//! Update dispatcher.

use crate::classify::{classify, UpdateKind};
use crate::envelope::{
    CallbackAction, ChosenInlineResultNotice, CommandMessage, InlineQueryRequest, MessageEnvelope,
    TextMessage,
};
use crate::handler::{run_chain, HandlerResult};
use crate::registry::{Registry, Route};
use std::fmt;
use std::sync::Arc;
use telegram_client::Update;
use tracing::{debug, instrument, warn};

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The chain for `route` ran to completion.
    Handled { route: Route, handlers: usize },
    /// Nothing was listening. Not an error.
    Unrouted(Miss),
}

impl Outcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Outcome::Handled { .. })
    }
}

/// Why an update was not routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Miss {
    NoHandlers(Route),
    /// Callback data without a usable action tag.
    MalformedCallbackData(String),
    Unrecognized,
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Miss::NoHandlers(route) => write!(f, "no handler registered for {}", route),
            Miss::MalformedCallbackData(data) => {
                write!(f, "no callback action in data {:?}", data)
            }
            Miss::Unrecognized => f.write_str("unrecognized update"),
        }
    }
}

/// Routes updates to the handler chains in a [`Registry`].
///
/// Owns the registry, so handlers can only be registered before the
/// dispatcher is built. `handle` takes `&self` and keeps no per-update
/// state, so independent updates may be dispatched concurrently.
pub struct Dispatcher<C> {
    bot: Arc<C>,
    registry: Registry<C>,
}

impl<C> Dispatcher<C>
where
    C: Send + Sync,
{
    pub fn new(bot: Arc<C>, registry: Registry<C>) -> Self {
        Self { bot, registry }
    }

    /// The bot context passed to every handler.
    pub fn bot(&self) -> &Arc<C> {
        &self.bot
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Classify `update` and run the matching handler chain.
    ///
    /// Routing misses resolve to [`Outcome::Unrouted`]. Only handler
    /// failures are returned as errors.
    #[instrument(skip_all, fields(update_id = update.update_id))]
    pub async fn handle(&self, update: &Update) -> HandlerResult<Outcome> {
        let kind = classify(update);
        debug!(?kind, "Classified update");

        match (kind, update) {
            (
                UpdateKind::Command { name, args },
                Update {
                    message: Some(message),
                    ..
                },
            ) => {
                let route = Route::Command(name.clone());
                let Some(handlers) = self.registry.command_handlers(&name) else {
                    return Ok(self.miss(Miss::NoHandlers(route)));
                };

                let envelope = CommandMessage {
                    command: name,
                    args,
                    message: TextMessage::new(message),
                };
                run_chain(handlers, self.bot.as_ref(), &envelope).await?;
                Ok(Outcome::Handled {
                    route,
                    handlers: handlers.len(),
                })
            }
            (
                UpdateKind::Message(kind),
                Update {
                    message: Some(message),
                    ..
                },
            ) => {
                let route = Route::Message(kind);
                let Some(handlers) = self.registry.message_handlers(kind) else {
                    return Ok(self.miss(Miss::NoHandlers(route)));
                };

                let envelope = MessageEnvelope::new(kind, message);
                run_chain(handlers, self.bot.as_ref(), &envelope).await?;
                Ok(Outcome::Handled {
                    route,
                    handlers: handlers.len(),
                })
            }
            (
                UpdateKind::CallbackAction { tag },
                Update {
                    callback_query: Some(query),
                    ..
                },
            ) => {
                let Some(tag) = tag else {
                    let data = query.data.clone().unwrap_or_default();
                    return Ok(self.miss(Miss::MalformedCallbackData(data)));
                };
                let route = Route::CallbackAction(tag.clone());
                let Some(handlers) = self.registry.callback_action_handlers(&tag) else {
                    return Ok(self.miss(Miss::NoHandlers(route)));
                };

                let envelope = CallbackAction::new(query);
                run_chain(handlers, self.bot.as_ref(), &envelope).await?;
                Ok(Outcome::Handled {
                    route,
                    handlers: handlers.len(),
                })
            }
            (
                UpdateKind::InlineQuery,
                Update {
                    inline_query: Some(query),
                    ..
                },
            ) => {
                let handlers = self.registry.inline_query_handlers();
                if handlers.is_empty() {
                    return Ok(self.miss(Miss::NoHandlers(Route::InlineQuery)));
                }

                let envelope = InlineQueryRequest::new(query);
                run_chain(handlers, self.bot.as_ref(), &envelope).await?;
                Ok(Outcome::Handled {
                    route: Route::InlineQuery,
                    handlers: handlers.len(),
                })
            }
            (
                UpdateKind::ChosenInlineResult,
                Update {
                    chosen_inline_result: Some(result),
                    ..
                },
            ) => {
                let handlers = self.registry.chosen_inline_result_handlers();
                if handlers.is_empty() {
                    return Ok(self.miss(Miss::NoHandlers(Route::ChosenInlineResult)));
                }

                let envelope = ChosenInlineResultNotice::new(result);
                run_chain(handlers, self.bot.as_ref(), &envelope).await?;
                Ok(Outcome::Handled {
                    route: Route::ChosenInlineResult,
                    handlers: handlers.len(),
                })
            }
            _ => {
                let raw = serde_json::to_string(update).unwrap_or_default();
                warn!(update = %raw, "Unrecognized update");
                Ok(Outcome::Unrouted(Miss::Unrecognized))
            }
        }
    }

    fn miss(&self, miss: Miss) -> Outcome {
        warn!("Dropping update: {}", miss);
        Outcome::Unrouted(miss)
    }
}
