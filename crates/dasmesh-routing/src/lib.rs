//! DasMesh Message Delivery
//!
//! This module implements the simulated delivery layer:
//! - Discrete-event queue with a logical clock
//! - Fire-and-forget transport with loss and latency

pub mod error;
pub mod event_queue;
pub mod transport;

pub use error::{Result, RoutingError};
pub use event_queue::{EventQueue, ScheduledEvent};
pub use transport::{Delivery, Transport, TransportSettings, TransportStats, UnreliableTransport};
