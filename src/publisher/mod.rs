pub mod ws;

use crate::error::PublishError;

pub use ws::WsPublisher;

/// Outbound side of the feed: hands one serialized tick to the transport.
///
/// Returns how many subscribers the message was queued for. Zero subscribers
/// is not an error; an `Err` means the transport can no longer publish.
pub trait Publish {
    fn publish(&mut self, message: &str) -> Result<usize, PublishError>;
}

impl<P: Publish + ?Sized> Publish for Box<P> {
    fn publish(&mut self, message: &str) -> Result<usize, PublishError> {
        (**self).publish(message)
    }
}

/// Keeps every message in memory; used for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryPublisher {
    pub messages: Vec<String>,
}

impl Publish for MemoryPublisher {
    fn publish(&mut self, message: &str) -> Result<usize, PublishError> {
        self.messages.push(message.to_string());
        Ok(1)
    }
}
