//! Handler registry keyed by route.

use crate::classify::MessageKind;
use crate::envelope::{
    CallbackAction, ChosenInlineResultNotice, CommandMessage, InlineQueryRequest, MessageEnvelope,
};
use crate::handler::Handler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type CommandHandlers<C> = Vec<Arc<dyn Handler<C, CommandMessage>>>;
pub type MessageHandlers<C> = Vec<Arc<dyn Handler<C, MessageEnvelope>>>;
pub type CallbackActionHandlers<C> = Vec<Arc<dyn Handler<C, CallbackAction>>>;
pub type InlineQueryHandlers<C> = Vec<Arc<dyn Handler<C, InlineQueryRequest>>>;
pub type ChosenInlineResultHandlers<C> = Vec<Arc<dyn Handler<C, ChosenInlineResultNotice>>>;

/// Routing key for one handler chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Command(String),
    Message(MessageKind),
    CallbackAction(String),
    InlineQuery,
    ChosenInlineResult,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Command(name) => write!(f, "command /{}", name),
            Route::Message(kind) => write!(f, "{} message", kind),
            Route::CallbackAction(tag) => write!(f, "callback action {:?}", tag),
            Route::InlineQuery => f.write_str("inline query"),
            Route::ChosenInlineResult => f.write_str("chosen inline result"),
        }
    }
}

/// Ordered handler chains per route.
///
/// Populated once at startup and then moved into a
/// [`Dispatcher`](crate::Dispatcher), which only reads it. Registering the
/// same handler twice runs it twice. There is no removal.
pub struct Registry<C> {
    commands: HashMap<String, CommandHandlers<C>>,
    messages: HashMap<MessageKind, MessageHandlers<C>>,
    callback_actions: HashMap<String, CallbackActionHandlers<C>>,
    inline_queries: InlineQueryHandlers<C>,
    chosen_inline_results: ChosenInlineResultHandlers<C>,
}

impl<C> Registry<C> {
    /// Create an empty registry.
    ///
    /// The `Other` message kind starts with an empty chain so that
    /// unclassified messages resolve without a routing miss.
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert(MessageKind::Other, Vec::new());

        Self {
            commands: HashMap::new(),
            messages,
            callback_actions: HashMap::new(),
            inline_queries: Vec::new(),
            chosen_inline_results: Vec::new(),
        }
    }

    /// Append a handler for `/name`.
    pub fn register_command(
        &mut self,
        name: impl Into<String>,
        handler: impl Handler<C, CommandMessage> + 'static,
    ) -> &mut Self {
        self.commands
            .entry(name.into())
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Append a handler for messages of `kind`.
    pub fn register_message(
        &mut self,
        kind: MessageKind,
        handler: impl Handler<C, MessageEnvelope> + 'static,
    ) -> &mut Self {
        self.messages.entry(kind).or_default().push(Arc::new(handler));
        self
    }

    /// Append a handler for callback actions tagged `tag`.
    pub fn register_callback_action(
        &mut self,
        tag: impl Into<String>,
        handler: impl Handler<C, CallbackAction> + 'static,
    ) -> &mut Self {
        self.callback_actions
            .entry(tag.into())
            .or_default()
            .push(Arc::new(handler));
        self
    }

    pub fn register_inline_query(
        &mut self,
        handler: impl Handler<C, InlineQueryRequest> + 'static,
    ) -> &mut Self {
        self.inline_queries.push(Arc::new(handler));
        self
    }

    pub fn register_chosen_inline_result(
        &mut self,
        handler: impl Handler<C, ChosenInlineResultNotice> + 'static,
    ) -> &mut Self {
        self.chosen_inline_results.push(Arc::new(handler));
        self
    }

    pub fn command_handlers(&self, name: &str) -> Option<&[Arc<dyn Handler<C, CommandMessage>>]> {
        self.commands.get(name).map(Vec::as_slice)
    }

    pub fn message_handlers(
        &self,
        kind: MessageKind,
    ) -> Option<&[Arc<dyn Handler<C, MessageEnvelope>>]> {
        self.messages.get(&kind).map(Vec::as_slice)
    }

    pub fn callback_action_handlers(
        &self,
        tag: &str,
    ) -> Option<&[Arc<dyn Handler<C, CallbackAction>>]> {
        self.callback_actions.get(tag).map(Vec::as_slice)
    }

    pub fn inline_query_handlers(&self) -> &[Arc<dyn Handler<C, InlineQueryRequest>>] {
        &self.inline_queries
    }

    pub fn chosen_inline_result_handlers(
        &self,
    ) -> &[Arc<dyn Handler<C, ChosenInlineResultNotice>>] {
        &self.chosen_inline_results
    }

    /// Every route with at least one handler, sorted for stable output.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .commands
            .keys()
            .cloned()
            .map(Route::Command)
            .chain(
                self.messages
                    .iter()
                    .filter(|(_, handlers)| !handlers.is_empty())
                    .map(|(kind, _)| Route::Message(*kind)),
            )
            .chain(self.callback_actions.keys().cloned().map(Route::CallbackAction))
            .collect();

        if !self.inline_queries.is_empty() {
            routes.push(Route::InlineQuery);
        }
        if !self.chosen_inline_results.is_empty() {
            routes.push(Route::ChosenInlineResult);
        }

        routes.sort_by_key(|route| route.to_string());
        routes
    }

    /// Total number of registered handlers across all routes.
    pub fn handler_count(&self) -> usize {
        self.commands.values().map(Vec::len).sum::<usize>()
            + self.messages.values().map(Vec::len).sum::<usize>()
            + self.callback_actions.values().map(Vec::len).sum::<usize>()
            + self.inline_queries.len()
            + self.chosen_inline_results.len()
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}
