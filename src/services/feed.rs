use crate::models::FeedPayload;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Pushes buffered per subscription before the producer waits
pub const FEED_BUFFER: usize = 16;

/// A source of full-collection driver snapshots
pub trait FeedSource: Send + Sync {
    /// Start receiving pushes for `collection_path`
    ///
    /// The subscription is released when it is dropped or
    /// [`FeedSubscription::unsubscribe`] is called, whichever comes first.
    fn subscribe(&self, collection_path: &str) -> FeedSubscription;
}

/// Receiving end of a feed subscription
///
/// Producers watch the paired [`CancellationToken`] and stop once it fires.
pub struct FeedSubscription {
    pushes: mpsc::Receiver<FeedPayload>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl FeedSubscription {
    pub fn new(pushes: mpsc::Receiver<FeedPayload>, cancel: CancellationToken) -> Self {
        let guard = cancel.clone().drop_guard();
        Self {
            pushes,
            cancel,
            _guard: guard,
        }
    }

    /// Create a subscription together with the sender and token a producer needs
    pub fn channel() -> (mpsc::Sender<FeedPayload>, CancellationToken, Self) {
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let cancel = CancellationToken::new();
        (tx, cancel.clone(), Self::new(rx, cancel))
    }

    /// Next push in delivery order, `None` once released or the producer is gone
    pub async fn next(&mut self) -> Option<FeedPayload> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.pushes.recv().await
    }

    /// Release the subscription. Calling this more than once is harmless.
    pub fn unsubscribe(&mut self) {
        self.cancel.cancel();
        self.pushes.close();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

struct Subscriber {
    collection_path: String,
    tx: mpsc::Sender<FeedPayload>,
    cancel: CancellationToken,
}

impl Subscriber {
    fn is_released(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }
}

/// In-process feed: whatever is published is fanned out to every live
/// subscriber of the same collection. Clones share the subscriber list.
#[derive(Clone, Default)]
pub struct ChannelFeed {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl ChannelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Push a full collection to every live subscriber of `collection_path`
    ///
    /// Returns how many subscribers received it.
    pub async fn publish(&self, collection_path: &str, payload: FeedPayload) -> usize {
        let targets: Vec<mpsc::Sender<FeedPayload>> = {
            let mut subscribers = self.lock();
            subscribers.retain(|s| !s.is_released());
            subscribers
                .iter()
                .filter(|s| s.collection_path == collection_path)
                .map(|s| s.tx.clone())
                .collect()
        };

        let mut delivered = 0;
        for tx in targets {
            if tx.send(payload.clone()).await.is_ok() {
                delivered += 1;
            }
        }

        tracing::trace!("Published {} to {} subscribers", collection_path, delivered);
        delivered
    }

    /// Number of subscriptions on `collection_path` that have not been released
    pub fn active_subscribers(&self, collection_path: &str) -> usize {
        self.lock()
            .iter()
            .filter(|s| s.collection_path == collection_path && !s.is_released())
            .count()
    }
}

impl FeedSource for ChannelFeed {
    fn subscribe(&self, collection_path: &str) -> FeedSubscription {
        let (tx, cancel, subscription) = FeedSubscription::channel();
        self.lock().push(Subscriber {
            collection_path: collection_path.to_string(),
            tx,
            cancel,
        });
        tracing::debug!("New subscription on {}", collection_path);
        subscription
    }
}
