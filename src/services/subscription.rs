use crate::core::{normalize_collection, ProximityRanker};
use crate::models::{FeedStatus, ProximityView};
use crate::services::feed::FeedSource;
use crate::services::location::LocationProvider;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Collection the driver app writes positions to
pub const DRIVERS_COLLECTION: &str = "drivers";

/// One observation session: locate the user once, then keep a ranked view
/// of the drivers feed up to date until cancelled.
///
/// State goes `AwaitingLocation -> Subscribing -> Ready`, or ends in
/// `Failed` when no position can be obtained. Every feed push replaces the
/// previous result entirely. The feed subscription lives in [`Self::run`]'s
/// scope and is released on every way out of it.
pub struct ProximityFeed<L: LocationProvider, F: FeedSource> {
    location: L,
    feed: F,
    ranker: ProximityRanker,
    collection_path: String,
    view: watch::Sender<ProximityView>,
    cancel: CancellationToken,
}

impl<L: LocationProvider, F: FeedSource> ProximityFeed<L, F> {
    pub fn new(location: L, feed: F, ranker: ProximityRanker) -> Self {
        let (view, _) = watch::channel(ProximityView::default());

        Self {
            location,
            feed,
            ranker,
            collection_path: DRIVERS_COLLECTION.to_string(),
            view,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_collection(mut self, collection_path: impl Into<String>) -> Self {
        self.collection_path = collection_path.into();
        self
    }

    /// Receiver for the latest view
    pub fn view(&self) -> watch::Receiver<ProximityView> {
        self.view.subscribe()
    }

    /// Stop the session at its next suspension point
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    fn publish(&self, view: ProximityView) {
        self.view.send_replace(view);
    }

    /// Drive the session to completion, returning the last status
    pub async fn run(&self) -> FeedStatus {
        self.publish(ProximityView::awaiting_location());
        tracing::info!("Requesting current position");

        let located = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return self.view.borrow().status,
            located = self.location.request_current_position() => located,
        };

        let reference = match located {
            Ok(reference) => reference,
            Err(e) => {
                tracing::error!("Failed to determine position: {}", e);
                self.publish(ProximityView::failed(e.kind()));
                return FeedStatus::Failed;
            }
        };

        tracing::info!(
            "Reference point ({}, {}), subscribing to {}",
            reference.latitude,
            reference.longitude,
            self.collection_path
        );

        let mut subscription = self.feed.subscribe(&self.collection_path);
        self.publish(ProximityView::subscribing());

        loop {
            let push = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                push = subscription.next() => push,
            };

            let Some(payload) = push else {
                tracing::info!("Feed {} closed", self.collection_path);
                break;
            };

            let result = self.ranker.compute(reference, normalize_collection(payload));

            tracing::debug!(
                "Recomputed view: {} of {} drivers within {} km",
                result.entities.len(),
                result.total_tracked,
                self.ranker.radius_km()
            );

            self.publish(ProximityView::ready(result.entities, result.total_tracked));
        }

        subscription.unsubscribe();
        tracing::info!("Released subscription to {}", self.collection_path);

        self.view.borrow().status
    }
}

impl<L, F> ProximityFeed<L, F>
where
    L: LocationProvider + 'static,
    F: FeedSource + 'static,
{
    /// Run the session on its own task
    pub fn spawn(self) -> Observation {
        let view = self.view();
        let cancel = self.cancel.clone();
        let guard = cancel.clone().drop_guard();
        let task = tokio::spawn(async move { self.run().await });

        Observation {
            view,
            cancel,
            task,
            _guard: guard,
        }
    }
}

/// Handle to a spawned session. Dropping it cancels the session.
pub struct Observation {
    view: watch::Receiver<ProximityView>,
    cancel: CancellationToken,
    task: JoinHandle<FeedStatus>,
    _guard: DropGuard,
}

impl Observation {
    pub fn view(&self) -> watch::Receiver<ProximityView> {
        self.view.clone()
    }

    pub fn current(&self) -> ProximityView {
        self.view.borrow().clone()
    }

    /// Cancel the session and wait for it to release its subscription
    pub async fn shutdown(self) -> FeedStatus {
        self.cancel.cancel();
        match self.task.await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Observation task failed: {}", e);
                FeedStatus::Failed
            }
        }
    }
}
