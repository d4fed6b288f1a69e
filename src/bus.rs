//! Inter-module message bus.
//!
//! Messages are transient and delivered at most once to every live module
//! instance, in registration order. Modules never hold references to each
//! other; they publish into the shell's [`Outbox`] and the shell drains it
//! synchronously as soon as the publishing callback returns.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::error::ModuleError;

/// Well-known topics.
pub mod topics {
    /// Observed by the shell itself. Payload: target module id (`String`).
    pub const ACTIVATE: &str = "shell.activate";
    /// Payload: `PathBuf` of a text document.
    pub const TEXT_OPEN: &str = "text.open";
    /// Payload: `PathBuf` of an image.
    pub const IMAGE_OPEN: &str = "image.open";
    /// Payload: `PathBuf` of a PDF document.
    pub const PDF_OPEN: &str = "pdf.open";
    /// Payload: `String` to place in the chat input.
    pub const CHAT_PROMPT: &str = "chat.prompt";
}

/// A topic plus an opaque payload.
#[derive(Clone)]
pub struct BusMessage {
    topic: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl BusMessage {
    pub fn new<T: Any + Send + Sync>(topic: impl Into<String>, payload: T) -> Self {
        Self {
            topic: topic.into(),
            payload: Arc::new(payload),
        }
    }

    /// A message with no payload.
    pub fn signal(topic: impl Into<String>) -> Self {
        Self::new(topic, ())
    }

    /// Ask the shell to bring `module` to the front.
    pub fn activate(module: impl Into<String>) -> Self {
        Self::new(topics::ACTIVATE, module.into())
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is(&self, topic: &str) -> bool {
        self.topic == topic
    }

    pub fn payload<T: Any>(&self) -> Option<&T> {
        (*self.payload).downcast_ref::<T>()
    }

    /// Typed payload access that reports a mismatch as a module error.
    pub fn expect_payload<T: Any>(&self) -> Result<&T, ModuleError> {
        self.payload::<T>()
            .ok_or_else(|| ModuleError::UnexpectedPayload(self.topic.clone()))
    }
}

impl fmt::Debug for BusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusMessage")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

/// FIFO of messages waiting for delivery within the current event.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<BusMessage>,
}

impl Outbox {
    pub fn push(&mut self, message: BusMessage) {
        self.queue.push_back(message);
    }

    pub fn pop(&mut self) -> Option<BusMessage> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop everything still queued, returning how many messages were lost.
    pub fn clear(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        n
    }
}

/// Outcome of delivering one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Live instances that handled the message without error.
    pub delivered: usize,
    /// Live instances whose handler failed; failures are logged, not propagated.
    pub failed: usize,
}

impl Delivery {
    pub fn subscribers(&self) -> usize {
        self.delivered + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_typed_payload() {
        let msg = BusMessage::new(topics::IMAGE_OPEN, PathBuf::from("cat.png"));
        assert!(msg.is(topics::IMAGE_OPEN));
        assert_eq!(msg.payload::<PathBuf>(), Some(&PathBuf::from("cat.png")));
        assert!(msg.payload::<String>().is_none());
    }

    #[test]
    fn test_expect_payload_mismatch() {
        let msg = BusMessage::signal(topics::PDF_OPEN);
        match msg.expect_payload::<PathBuf>() {
            Err(ModuleError::UnexpectedPayload(topic)) => assert_eq!(topic, topics::PDF_OPEN),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_activate_message() {
        let msg = BusMessage::activate("notepad");
        assert_eq!(msg.topic(), topics::ACTIVATE);
        assert_eq!(msg.payload::<String>().map(String::as_str), Some("notepad"));
    }

    #[test]
    fn test_outbox_is_fifo() {
        let mut outbox = Outbox::default();
        outbox.push(BusMessage::signal("a"));
        outbox.push(BusMessage::signal("b"));
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox.pop().unwrap().topic(), "a");
        assert_eq!(outbox.pop().unwrap().topic(), "b");
        assert!(outbox.pop().is_none());
    }
}
