pub mod claims;
pub mod click_event;
pub mod dashboard;
pub mod geo;
pub mod link;

pub use claims::UserClaims;
pub use click_event::{ClickEvent, ClickGeo, ClickRequestMeta};
pub use dashboard::{DashboardRequest, DashboardResponse, StatLink, TopLink};
pub use geo::GeoLocation;
pub use link::{Link, LinkProjection, NewLink, UrlMetadata};
