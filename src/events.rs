// src/events.rs
//! Hand-off of computed features to a broadcast collaborator
//!
//! Delivery to remote subscribers (sessions, sockets, framing, retries) is
//! the publisher's business. This crate only builds typed events and passes
//! them on.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Computed feature values carried by a [`FeatureEvent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeaturePayload {
    /// `(frequency Hz, log power)` pairs in request order
    LogPowers(Vec<(f64, f64)>),
    Spectrum(Vec<f64>),
    Scalar(f64),
}

/// `(host, port)` identity of a remote subscriber
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A feature value tagged with the caller's event type enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEvent<E> {
    pub event_type: E,
    pub payload: FeaturePayload,
    /// Single recipient; `None` broadcasts to every subscriber of `event_type`
    pub target: Option<HostPort>,
    pub timestamp: SystemTime,
}

impl<E> FeatureEvent<E> {
    pub fn new(event_type: E, payload: FeaturePayload) -> Self {
        Self {
            event_type,
            payload,
            target: None,
            timestamp: SystemTime::now(),
        }
    }

    /// Address the event to one subscriber
    pub fn with_target(mut self, target: HostPort) -> Self {
        self.target = Some(target);
        self
    }
}

/// Accepts events for asynchronous delivery to zero or more subscribers
pub trait EventPublisher<E>: Send + Sync {
    fn publish(&self, event: FeatureEvent<E>);
}

impl<E, F> EventPublisher<E> for F
where
    F: Fn(FeatureEvent<E>) + Send + Sync,
{
    fn publish(&self, event: FeatureEvent<E>) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        Alpha,
    }

    #[test]
    fn test_closure_publisher() {
        let received = Mutex::new(Vec::new());
        let publisher = |event: FeatureEvent<Kind>| received.lock().push(event);

        publisher.publish(FeatureEvent::new(Kind::Alpha, FeaturePayload::Scalar(1.5)));
        publisher.publish(
            FeatureEvent::new(Kind::Alpha, FeaturePayload::Scalar(2.5))
                .with_target(HostPort::new("10.0.0.7", 5050)),
        );

        let received = received.lock();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].target, None);
        assert_eq!(received[1].target.as_ref().map(|t| t.to_string()), Some("10.0.0.7:5050".to_string()));
    }
}
