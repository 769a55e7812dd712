// Model exports
pub mod domain;
pub mod records;
pub mod responses;

pub use domain::{BoundingBox, Coordinate, EntitySnapshot, ErrorKind, FeedStatus, RankedEntity};
pub use records::{FeedPayload, RawCoordinates, RawRecord};
pub use responses::{ActionResponse, ErrorResponse, HealthResponse, ProximityView};
