use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subwatch_core::{CoreError, FeedError, ItemKind, ItemRecord, ParentPost};
use tracing::{debug, warn};

const DELETED_AUTHOR: &str = "[deleted]";

/// One page of the platform's listing JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub kind: String,
    pub data: ListingData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingData {
    pub children: Vec<ListingChild>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

/// Child payloads stay untyped until [`ListingChild::parse`] so one bad
/// child cannot fail the whole page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingChild {
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: Option<String>,
    pub subreddit: String,
    pub permalink: String,
    pub url: String,
    pub created_utc: f64,
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
    pub num_comments: u32,
    pub over_18: bool,
    pub stickied: bool,
    pub is_self: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentData {
    pub id: String,
    pub body: String,
    pub author: Option<String>,
    pub subreddit: String,
    pub link_id: String,
    pub link_title: Option<String>,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub ups: i64,
    pub downs: i64,
}

#[derive(Debug, Clone)]
pub enum Thing {
    Post(PostData),
    Comment(CommentData),
}

impl Thing {
    pub fn kind(&self) -> ItemKind {
        match self {
            Thing::Post(_) => ItemKind::Post,
            Thing::Comment(_) => ItemKind::Comment,
        }
    }
}

impl ListingChild {
    pub fn parse(&self) -> Option<Thing> {
        let parsed = match self.kind.as_str() {
            "t3" => serde_json::from_value(self.data.clone()).map(Thing::Post),
            "t1" => serde_json::from_value(self.data.clone()).map(Thing::Comment),
            other => {
                debug!("Skipping listing child of kind {}", other);
                return None;
            }
        };

        match parsed {
            Ok(thing) => Some(thing),
            Err(e) => {
                warn!("Skipping malformed {} child: {}", self.kind, e);
                None
            }
        }
    }
}

impl Listing {
    pub fn from_json(subreddit: &str, raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(|e| {
            CoreError::Feed(FeedError::InvalidListing {
                subreddit: subreddit.to_string(),
                details: e.to_string(),
            })
        })
    }

    /// Converts every child of `kind`, in page order.
    pub fn into_items(self, kind: ItemKind) -> Vec<ItemRecord> {
        self.data
            .children
            .iter()
            .filter_map(ListingChild::parse)
            .filter(|thing| thing.kind() == kind)
            .map(ItemRecord::from)
            .collect()
    }
}

fn timestamp_from_epoch(created_utc: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(created_utc as i64, 0).unwrap_or_default()
}

fn normalize_author(author: Option<String>) -> Option<String> {
    author.filter(|name| !name.trim().is_empty() && name != DELETED_AUTHOR)
}

fn non_negative(count: i64) -> u64 {
    count.max(0) as u64
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl From<PostData> for ItemRecord {
    fn from(post: PostData) -> Self {
        ItemRecord {
            id: post.id,
            kind: ItemKind::Post,
            author: normalize_author(post.author),
            created_at: timestamp_from_epoch(post.created_utc),
            title: non_empty(post.title),
            body: if post.is_self {
                non_empty(post.selftext)
            } else {
                None
            },
            positive_signal: non_negative(post.ups),
            negative_signal: non_negative(post.downs),
            subreddit: post.subreddit,
            parent: None,
        }
    }
}

impl From<CommentData> for ItemRecord {
    fn from(comment: CommentData) -> Self {
        let parent = non_empty(comment.link_id).map(|link_id| ParentPost {
            id: link_id.trim_start_matches("t3_").to_string(),
            title: comment.link_title,
        });

        ItemRecord {
            id: comment.id,
            kind: ItemKind::Comment,
            author: normalize_author(comment.author),
            created_at: timestamp_from_epoch(comment.created_utc),
            title: None,
            body: non_empty(comment.body),
            positive_signal: non_negative(comment.ups),
            negative_signal: non_negative(comment.downs),
            subreddit: comment.subreddit,
            parent,
        }
    }
}

impl From<Thing> for ItemRecord {
    fn from(thing: Thing) -> Self {
        match thing {
            Thing::Post(post) => post.into(),
            Thing::Comment(comment) => comment.into(),
        }
    }
}
