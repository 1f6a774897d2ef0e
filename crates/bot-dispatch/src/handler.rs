//! Handler trait and the sequential chain runner.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result returned by every handler. Failures propagate verbatim to the
/// caller of [`Dispatcher::handle`](crate::Dispatcher::handle).
pub type HandlerResult<T = ()> = anyhow::Result<T>;

/// A handler for one kind of envelope.
///
/// `C` is the bot context injected into the dispatcher at construction
/// (clients, data stores). `E` is the typed envelope built for the update.
#[async_trait]
pub trait Handler<C, E>: Send + Sync {
    /// Handle one envelope.
    async fn handle(&self, bot: &C, envelope: &E) -> HandlerResult;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Run `handlers` in order against the same envelope.
///
/// Each handler runs to completion before the next starts. The first
/// failure stops the chain and is returned unchanged. An empty chain
/// succeeds immediately.
pub async fn run_chain<C, E>(
    handlers: &[Arc<dyn Handler<C, E>>],
    bot: &C,
    envelope: &E,
) -> HandlerResult {
    for (position, handler) in handlers.iter().enumerate() {
        debug!(handler = handler.name(), position, "Running handler");

        if let Err(e) = handler.handle(bot, envelope).await {
            warn!(
                handler = handler.name(),
                position,
                remaining = handlers.len() - position - 1,
                "Handler failed: {:#}",
                e
            );
            return Err(e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Journal {
        entries: Mutex<Vec<String>>,
    }

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.entries.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    struct Step {
        label: &'static str,
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl Handler<Journal, String> for Step {
        async fn handle(&self, journal: &Journal, envelope: &String) -> HandlerResult {
            journal.push(format!("{} start {}", self.label, envelope));
            tokio::time::sleep(self.delay).await;
            if self.fail {
                anyhow::bail!("{} failed", self.label);
            }
            journal.push(format!("{} end", self.label));
            Ok(())
        }
    }

    fn step(label: &'static str, delay_ms: u64, fail: bool) -> Arc<dyn Handler<Journal, String>> {
        Arc::new(Step {
            label,
            delay: Duration::from_millis(delay_ms),
            fail,
        })
    }

    #[test]
    fn test_empty_chain_succeeds() {
        let journal = Journal::default();
        let envelope = "x".to_string();

        tokio_test::assert_ok!(tokio_test::block_on(run_chain::<Journal, String>(
            &[],
            &journal,
            &envelope
        )));
        assert!(journal.entries().is_empty());
    }

    #[tokio::test]
    async fn test_handlers_run_sequentially() {
        let journal = Journal::default();
        // The slow first handler must finish before the second starts.
        let chain = vec![step("a", 30, false), step("b", 0, false)];

        run_chain(&chain, &journal, &"msg".to_string()).await.unwrap();

        assert_eq!(
            journal.entries(),
            vec!["a start msg", "a end", "b start msg", "b end"]
        );
    }

    #[tokio::test]
    async fn test_failure_short_circuits() {
        let journal = Journal::default();
        let chain = vec![step("a", 0, false), step("b", 0, true), step("c", 0, false)];

        let err = tokio_test::assert_err!(run_chain(&chain, &journal, &"msg".to_string()).await);

        assert_eq!(err.to_string(), "b failed");
        assert_eq!(journal.entries(), vec!["a start msg", "a end", "b start msg"]);
    }

    #[test]
    fn test_default_name_is_type_name() {
        let handler = Step {
            label: "a",
            delay: Duration::ZERO,
            fail: false,
        };
        assert!(Handler::<Journal, String>::name(&handler).ends_with("Step"));
    }
}
