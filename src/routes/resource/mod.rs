mod handler;
mod model;

pub use handler::{feed, stats};
pub use model::{FeedItem, FeedResponse, StatsResponse};
