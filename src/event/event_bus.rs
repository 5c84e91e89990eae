// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for fireplace events.

use tokio::sync::broadcast;

use super::FireplaceEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fan-out of [`FireplaceEvent`]s to any number of subscribers.
///
/// Backed by a tokio broadcast channel. A subscriber that falls more than the
/// capacity behind loses the oldest events (`RecvError::Lagged`); since every
/// `StateChanged` carries a full snapshot, catching up only needs the latest.
///
/// # Examples
///
/// ```
/// use mertik_lib::event::{EventBus, FireplaceEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(FireplaceEvent::UpdateFailed {
///     reason: "connection refused".into(),
/// });
/// assert!(matches!(rx.try_recv(), Ok(FireplaceEvent::UpdateFailed { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FireplaceEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FireplaceEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event; without subscribers it is dropped.
    pub fn publish(&self, event: FireplaceEvent) {
        // no subscribers is not an error
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(reason: &str) -> FireplaceEvent {
        FireplaceEvent::UpdateFailed {
            reason: reason.to_string(),
        }
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(failed("timeout"));

        assert!(matches!(rx1.recv().await.unwrap(), FireplaceEvent::UpdateFailed { reason } if reason == "timeout"));
        assert!(matches!(rx2.recv().await.unwrap(), FireplaceEvent::UpdateFailed { .. }));
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        EventBus::new().publish(failed("nobody listens"));
    }

    #[test]
    fn clones_share_the_channel() {
        let bus = EventBus::new();
        let other = bus.clone();
        let _rx = bus.subscribe();
        assert_eq!(other.subscriber_count(), 1);
    }

    #[test]
    fn lagging_subscriber_loses_oldest() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();
        for i in 0..3 {
            bus.publish(failed(&i.to_string()));
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }
}
