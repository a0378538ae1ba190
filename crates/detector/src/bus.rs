//! Cross-context message passing
//!
//! Two independent channels connect the contexts: addressed requests to
//! the page agent, acknowledged synchronously with a [`PageAck`], and
//! unaddressed [`Broadcast`]s fanned out to every current subscriber.
//! Delivery is at-most-once, best-effort, with no ordering guarantee
//! between independently-sent messages. There is no causal link between a
//! request and the next broadcast received; two extractions fired in quick
//! succession may interleave.

use log::debug;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::models::{EmailItem, InboxExtraction, Prediction};

/// A request addressed to the page agent
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    /// Scrape the single open email (subject + body)
    ExtractSingle,
    /// Scrape the inbox listing (subject + snippet per row)
    ExtractList,
    /// Render badges for a prediction batch, positionally matched
    ApplyPredictions(Vec<Prediction>),
    /// Remove all badges and the detail popup
    ClearUi,
}

/// Immediate synchronous acknowledgment of a page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAck {
    pub success: bool,
    /// Number of items found, for extraction requests
    pub count: usize,
}

impl PageAck {
    pub fn ok(count: usize) -> Self {
        Self {
            success: true,
            count,
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            count: 0,
        }
    }
}

/// An unaddressed message received by any currently subscribed listener
#[derive(Debug, Clone, PartialEq)]
pub enum Broadcast {
    /// A single open email was extracted
    SingleExtracted(EmailItem),
    /// An inbox listing was extracted
    ListExtracted(InboxExtraction),
}

/// Publish/subscribe fan-out for broadcasts
///
/// Subscribers that have gone away are pruned on the next publish; a
/// broadcast arriving after a listener's teardown is simply lost, which
/// the protocol tolerates.
pub struct MessageBus {
    subscribers: Mutex<Vec<Sender<Broadcast>>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to all future broadcasts
    pub fn subscribe(&self) -> Receiver<Broadcast> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Send a broadcast to every live subscriber
    pub fn publish(&self, broadcast: Broadcast) {
        let mut subscribers = self.subscribers.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(broadcast.clone()).is_ok());
        if subscribers.len() < before {
            debug!(
                "Pruned {} dead broadcast subscriber(s)",
                before - subscribers.len()
            );
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let bus = MessageBus::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();

        let item = EmailItem::new("Subject", "Body");
        bus.publish(Broadcast::SingleExtracted(item.clone()));

        assert_eq!(rx1.try_recv().unwrap(), Broadcast::SingleExtracted(item.clone()));
        assert_eq!(rx2.try_recv().unwrap(), Broadcast::SingleExtracted(item));
    }

    #[test]
    fn test_publish_with_no_subscribers_is_lost() {
        let bus = MessageBus::new();
        // Best-effort: nothing to assert beyond "does not panic"
        bus.publish(Broadcast::ListExtracted(InboxExtraction::new(vec![])));
    }

    #[test]
    fn test_dead_subscriber_pruned() {
        let bus = MessageBus::new();
        let rx = bus.subscribe();
        drop(rx);

        bus.publish(Broadcast::SingleExtracted(EmailItem::new("S", "B")));
        assert!(bus.subscribers.lock().unwrap().is_empty());
    }
}
