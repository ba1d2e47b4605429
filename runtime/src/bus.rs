//! In-process message bus.
//!
//! Handlers are registered per [`MessageType`] and run sequentially in
//! registration order on the caller's task. There is no isolation between
//! handlers: the first error stops the chain and is returned from
//! [`MessageBus::handle`].
//!
//! A handler returns the follow-on messages it produced. They are dispatched
//! depth-first right after the handler returns, before the next sibling handler
//! runs, the same order an in-handler publish would give.
//!
//! Buses are cheap and meant to be built per request (see [`crate::routes`]);
//! nothing is shared between instances.

use futures::FutureExt;
use shoutout_core::{BoxFuture, BusMessage, Message, MessageType, SagaError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// What a handler hands back to the bus.
pub type HandlerResult = Result<Vec<Message>, SagaError>;

type Handler = Arc<dyn Fn(Message) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Ordered handler registry.
#[derive(Default, Clone)]
pub struct MessageBus {
    handlers: HashMap<MessageType, Vec<Handler>>,
}

impl MessageBus {
    /// Empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for messages of type `M`.
    pub fn register<M, F, Fut>(&mut self, handler: F)
    where
        M: BusMessage,
        F: Fn(M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let erased: Handler = Arc::new(move |message: Message| match M::from_message(message) {
            Some(typed) => handler(typed).boxed(),
            None => futures::future::ready(Ok(Vec::new())).boxed(),
        });
        self.handlers.entry(M::TYPE).or_default().push(erased);
    }

    /// Number of handlers registered for a message type.
    #[must_use]
    pub fn handler_count(&self, message_type: MessageType) -> usize {
        self.handlers.get(&message_type).map_or(0, Vec::len)
    }

    /// Dispatches `message` to every handler of its type, in order.
    ///
    /// # Errors
    ///
    /// The first error raised by a handler or by any follow-on message.
    pub fn handle(&self, message: Message) -> BoxFuture<'_, Result<(), SagaError>> {
        Box::pin(async move {
            let message_type = message.message_type();
            let Some(handlers) = self.handlers.get(&message_type) else {
                tracing::debug!(message = message_type.name(), "no handlers registered");
                return Ok(());
            };
            for handler in handlers {
                let follow_ups = handler(message.clone()).await.inspect_err(|error| {
                    tracing::debug!(message = message_type.name(), %error, "handler failed");
                })?;
                for follow_up in follow_ups {
                    self.handle(follow_up).await?;
                }
            }
            Ok(())
        })
    }
}
