//! Update dispatch and command routing for Telegram bots.
//!
//! A [`Registry`] maps routes (commands, message kinds, callback actions,
//! inline queries and chosen inline results) to ordered handler chains.
//! A [`Dispatcher`] classifies each incoming update, builds a typed
//! envelope and runs the matching chain sequentially.

mod classify;
mod dispatcher;
mod envelope;
mod handler;
mod registry;

pub use classify::{callback_action_tag, classify, parse_command, MessageKind, UpdateKind};
pub use dispatcher::{Dispatcher, Miss, Outcome};
pub use envelope::*;
pub use handler::{run_chain, Handler, HandlerResult};
pub use registry::{
    CallbackActionHandlers, ChosenInlineResultHandlers, CommandHandlers, InlineQueryHandlers,
    MessageHandlers, Registry, Route,
};
