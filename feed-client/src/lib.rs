pub mod feed;
pub mod listing;
pub mod replay;

pub use feed::{BatchReceiver, ItemFeed};
pub use listing::{Listing, ListingChild, ListingData, Thing};
pub use replay::{ReplayFeed, DEFAULT_DELIVERY_INTERVAL};

#[cfg(test)]
mod tests;
