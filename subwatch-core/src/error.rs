use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout after {seconds} seconds")]
    Timeout { seconds: u64 },
}

#[derive(Error, Debug, Clone)]
pub enum FeedError {
    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Invalid listing for r/{subreddit}: {details}")]
    InvalidListing { subreddit: String, details: String },

    #[error("Subscription to r/{subreddit} failed: {reason}")]
    SubscriptionFailed { subreddit: String, reason: String },

    #[error("Replay capture for r/{subreddit} has no pages")]
    ReplayExhausted { subreddit: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
