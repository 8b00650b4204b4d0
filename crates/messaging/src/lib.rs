//! Domain event publication.
//!
//! Publishers accept [`EventMessage`]s and deliver them to subscribers at
//! least once.

pub mod broadcast;
pub mod error;
pub mod memory;
pub mod message;
pub mod publisher;

pub use broadcast::BroadcastEventPublisher;
pub use error::{PublishError, Result};
pub use memory::InMemoryEventPublisher;
pub use message::{EventMessage, EventMessageBuilder};
pub use publisher::EventPublisher;
