//! Message transport between simulated nodes
//!
//! Sending is fire-and-forget: the transport may drop or delay a message and
//! never reports delivery back to the sender.

use dasmesh_dht::NodeHandle;
use dasmesh_protocol::Envelope;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, RoutingError};
use crate::event_queue::{EventQueue, ScheduledEvent};

/// Outbound side of the transport as seen by a protocol instance
pub trait Transport {
    /// Hand a message to the transport
    fn send(
        &mut self,
        source: &NodeHandle,
        destination: &NodeHandle,
        envelope: Envelope,
    ) -> Result<()>;
}

/// A message waiting for delivery
#[derive(Debug, Clone)]
pub struct Delivery {
    pub destination: NodeHandle,
    pub envelope: Envelope,
}

/// Loss and latency model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Probability that a sent message is silently dropped
    pub drop_rate: f64,

    /// Minimum delivery delay (logical ms)
    pub min_delay_ms: u64,

    /// Maximum delivery delay (logical ms)
    pub max_delay_ms: u64,
}

impl TransportSettings {
    /// Lossless transport with a fixed delay
    pub fn reliable(delay_ms: u64) -> Self {
        TransportSettings {
            drop_rate: 0.0,
            min_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.drop_rate) {
            return Err(RoutingError::InvalidSettings(format!(
                "drop_rate must be within [0, 1], got {}",
                self.drop_rate
            )));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(RoutingError::InvalidSettings(format!(
                "min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings {
            drop_rate: 0.0,
            min_delay_ms: 10,
            max_delay_ms: 100,
        }
    }
}

/// Transport statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransportStats {
    pub messages_sent: u64,
    pub messages_dropped: u64,
    pub messages_delivered: u64,
    pub messages_undeliverable: u64,
    pub messages_injected: u64,
    pub bytes_sent: u64,
}

/// Transport that loses and delays messages according to [`TransportSettings`]
pub struct UnreliableTransport {
    settings: TransportSettings,
    queue: EventQueue<Delivery>,
    rng: StdRng,
    stats: TransportStats,
}

impl UnreliableTransport {
    /// Create a transport; `seed` makes loss and latency reproducible
    pub fn new(settings: TransportSettings, seed: u64) -> Result<Self> {
        settings.validate()?;
        Ok(UnreliableTransport {
            settings,
            queue: EventQueue::new(),
            rng: StdRng::seed_from_u64(seed),
            stats: TransportStats::default(),
        })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Current logical time
    pub fn now(&self) -> u64 {
        self.queue.now()
    }

    /// Messages still in flight
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Inject a message directly into the event queue.
    ///
    /// Used by the driver; bypasses the loss model.
    pub fn schedule(&mut self, delay: u64, destination: NodeHandle, envelope: Envelope) {
        self.stats.messages_injected += 1;
        self.queue.schedule_after(
            delay,
            Delivery {
                destination,
                envelope,
            },
        );
    }

    /// Next delivery due no later than `deadline`
    pub fn next_delivery(&mut self, deadline: u64) -> Option<ScheduledEvent<Delivery>> {
        let event = self.queue.pop_due(deadline)?;
        self.stats.messages_delivered += 1;
        Some(event)
    }

    /// Record a delivery that found its destination offline
    pub fn record_undeliverable(&mut self) {
        self.stats.messages_delivered -= 1;
        self.stats.messages_undeliverable += 1;
    }

    /// Move the clock forward to `time`
    pub fn advance_to(&mut self, time: u64) {
        self.queue.advance_to(time);
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    fn sample_delay(&mut self) -> u64 {
        if self.settings.min_delay_ms == self.settings.max_delay_ms {
            self.settings.min_delay_ms
        } else {
            self.rng
                .gen_range(self.settings.min_delay_ms..=self.settings.max_delay_ms)
        }
    }
}

impl Transport for UnreliableTransport {
    fn send(
        &mut self,
        source: &NodeHandle,
        destination: &NodeHandle,
        envelope: Envelope,
    ) -> Result<()> {
        self.stats.messages_sent += 1;
        self.stats.bytes_sent += envelope.encoded_len()? as u64;

        if self.settings.drop_rate > 0.0 && self.rng.gen_bool(self.settings.drop_rate) {
            self.stats.messages_dropped += 1;
            debug!(
                "Dropped {} from {} to {}",
                envelope.body.kind(),
                source,
                destination
            );
            return Ok(());
        }

        let delay = self.sample_delay();
        trace!(
            "Queued {} from {} to {} (delay {}ms)",
            envelope.body.kind(),
            source,
            destination,
            delay
        );
        self.queue.schedule_after(
            delay,
            Delivery {
                destination: *destination,
                envelope,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dasmesh_protocol::{DasMessage, Identifier};

    fn handle(index: usize) -> NodeHandle {
        NodeHandle::new(index, Identifier::from_bytes([index as u8; 32]))
    }

    fn envelope(src: &NodeHandle, dst: &NodeHandle) -> Envelope {
        Envelope::new(
            0,
            src.node_id,
            dst.node_id,
            DasMessage::SampleAssignment {
                sample_id: dst.node_id,
            },
        )
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad_rate = TransportSettings {
            drop_rate: 1.5,
            ..Default::default()
        };
        assert!(UnreliableTransport::new(bad_rate, 0).is_err());

        let bad_delay = TransportSettings {
            min_delay_ms: 10,
            max_delay_ms: 1,
            ..Default::default()
        };
        assert!(matches!(
            bad_delay.validate(),
            Err(RoutingError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_reliable_delivery_after_delay() {
        let mut transport = UnreliableTransport::new(TransportSettings::reliable(25), 0).unwrap();
        let (a, b) = (handle(1), handle(2));

        transport.send(&a, &b, envelope(&a, &b)).unwrap();
        assert_eq!(transport.pending(), 1);
        assert!(transport.next_delivery(24).is_none());

        let event = transport.next_delivery(25).unwrap();
        assert_eq!(event.time, 25);
        assert_eq!(event.payload.destination, b);
        assert_eq!(transport.now(), 25);

        let stats = transport.stats();
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.messages_delivered, 1);
        assert!(stats.bytes_sent > 0);
    }

    #[test]
    fn test_total_loss() {
        let settings = TransportSettings {
            drop_rate: 1.0,
            ..Default::default()
        };
        let mut transport = UnreliableTransport::new(settings, 3).unwrap();
        let (a, b) = (handle(1), handle(2));

        for _ in 0..10 {
            transport.send(&a, &b, envelope(&a, &b)).unwrap();
        }
        assert_eq!(transport.pending(), 0);
        assert_eq!(transport.stats().messages_dropped, 10);
    }

    #[test]
    fn test_delay_within_bounds() {
        let settings = TransportSettings {
            drop_rate: 0.0,
            min_delay_ms: 5,
            max_delay_ms: 15,
        };
        let mut transport = UnreliableTransport::new(settings, 11).unwrap();
        let (a, b) = (handle(1), handle(2));

        for _ in 0..50 {
            transport.send(&a, &b, envelope(&a, &b)).unwrap();
        }
        while let Some(event) = transport.next_delivery(u64::MAX) {
            assert!((5..=15).contains(&event.time));
        }
    }

    #[test]
    fn test_injected_messages_bypass_loss() {
        let settings = TransportSettings {
            drop_rate: 1.0,
            ..Default::default()
        };
        let mut transport = UnreliableTransport::new(settings, 0).unwrap();
        let (a, b) = (handle(1), handle(2));

        transport.schedule(0, b, envelope(&a, &b));
        assert_eq!(transport.pending(), 1);
        assert_eq!(transport.stats().messages_injected, 1);

        transport.next_delivery(0).unwrap();
        transport.record_undeliverable();
        assert_eq!(transport.stats().messages_delivered, 0);
        assert_eq!(transport.stats().messages_undeliverable, 1);
    }
}
