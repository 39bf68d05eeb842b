pub mod aggregator;
pub mod summary;

pub use aggregator::{Aggregator, AggregatorSnapshot, AuthorActivity};
pub use summary::{render_quick_stats, render_summary, NONE_AVAILABLE};

#[cfg(test)]
mod tests;
