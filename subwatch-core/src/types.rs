use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, ConfigError};

/// Marker appended to a preview that was cut short.
pub const TRUNCATION_MARKER: &str = "...";

/// Default number of characters kept in a one-line preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 50;

/// Shown in place of a missing author handle.
pub const UNKNOWN_AUTHOR: &str = "[unknown]";

/// Console timestamp layout, `MM/DD/YYYY HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Comment,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Post => "post",
            ItemKind::Comment => "comment",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ItemKind::Post => "posts",
            ItemKind::Comment => "comments",
        }
    }

    /// Listing child tag used by the platform (`t3` posts, `t1` comments).
    pub fn thing_prefix(&self) -> &'static str {
        match self {
            ItemKind::Post => "t3",
            ItemKind::Comment => "t1",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" | "posts" => Ok(ItemKind::Post),
            "comment" | "comments" => Ok(ItemKind::Comment),
            other => Err(CoreError::Config(ConfigError::InvalidValue {
                field: "kind".to_string(),
                value: other.to_string(),
            })),
        }
    }
}

/// The post a comment belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentPost {
    pub id: String,
    pub title: Option<String>,
}

/// Snapshot of one post or comment as observed on the feed.
///
/// Records are never mutated after they are received. A later observation
/// of the same id arrives as a new record carrying the updated vote counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub kind: ItemKind,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub positive_signal: u64,
    pub negative_signal: u64,
    pub subreddit: String,
    pub parent: Option<ParentPost>,
}

impl ItemRecord {
    pub fn new(id: impl Into<String>, kind: ItemKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            kind,
            author: None,
            created_at,
            title: None,
            body: None,
            positive_signal: 0,
            negative_signal: 0,
            subreddit: String::new(),
            parent: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_signals(mut self, positive: u64, negative: u64) -> Self {
        self.positive_signal = positive;
        self.negative_signal = negative;
        self
    }

    pub fn with_subreddit(mut self, subreddit: impl Into<String>) -> Self {
        self.subreddit = subreddit.into();
        self
    }

    pub fn with_parent(mut self, parent: ParentPost) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Author handle, or `None` when the feed did not supply a usable one.
    pub fn author(&self) -> Option<&str> {
        self.author
            .as_deref()
            .map(str::trim)
            .filter(|author| !author.is_empty())
    }

    pub fn display_author(&self) -> &str {
        self.author().unwrap_or(UNKNOWN_AUTHOR)
    }

    pub fn preview_text(&self) -> &str {
        let (primary, fallback) = match self.kind {
            ItemKind::Post => (&self.title, &self.body),
            ItemKind::Comment => (&self.body, &self.title),
        };
        primary
            .as_deref()
            .or(fallback.as_deref())
            .unwrap_or_default()
    }
}

/// Caps `text` at `max_chars` characters, appending [`TRUNCATION_MARKER`]
/// when anything was cut. Line breaks are flattened to spaces.
pub fn short_preview(text: &str, max_chars: usize) -> String {
    let flattened: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let flattened = flattened.trim();

    if flattened.chars().count() <= max_chars {
        return flattened.to_string();
    }

    let mut preview: String = flattened.chars().take(max_chars).collect();
    preview.push_str(TRUNCATION_MARKER);
    preview
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
