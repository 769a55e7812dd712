// Service exports
pub mod actions;
pub mod feed;
pub mod http_feed;
pub mod location;
pub mod subscription;

pub use actions::{ActionDelegate, ActionError, WebhookActions};
pub use feed::{ChannelFeed, FeedSource, FeedSubscription};
pub use http_feed::{FeedError, HttpFeed};
pub use location::{ConfiguredLocation, HttpLocation, LocationError, LocationProvider, StaticLocation};
pub use subscription::{Observation, ProximityFeed, DRIVERS_COLLECTION};
