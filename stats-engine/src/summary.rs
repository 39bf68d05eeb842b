//! Text reports over an [`AggregatorSnapshot`].
//!
//! Output is deterministic for a given snapshot so it can be asserted on
//! directly.

use std::fmt::Write;
use subwatch_core::{format_timestamp, short_preview, ItemRecord, DEFAULT_PREVIEW_CHARS};

use crate::aggregator::{AggregatorSnapshot, AuthorActivity};

/// Placeholder printed for any statistic that has no value yet.
pub const NONE_AVAILABLE: &str = "none available";

fn describe_author(activity: Option<&AuthorActivity>, noun: &str) -> String {
    match activity {
        Some(activity) => format!("{} ({} {})", activity.author, activity.count, noun),
        None => NONE_AVAILABLE.to_string(),
    }
}

fn describe_item(item: Option<&ItemRecord>) -> String {
    match item {
        Some(item) => format!(
            "{} by {} at {} \"{}\"",
            item.id,
            item.display_author(),
            format_timestamp(&item.created_at),
            short_preview(item.preview_text(), DEFAULT_PREVIEW_CHARS)
        ),
        None => NONE_AVAILABLE.to_string(),
    }
}

fn describe_signal(
    item: Option<&ItemRecord>,
    value: impl Fn(&ItemRecord) -> u64,
    unit: &str,
) -> String {
    match item {
        Some(record) => format!(
            "{} ({} {})",
            describe_item(Some(record)),
            value(record),
            unit
        ),
        None => NONE_AVAILABLE.to_string(),
    }
}

/// Final report: header plus one line per statistic.
pub fn render_summary(snapshot: &AggregatorSnapshot) -> String {
    let kind = snapshot.kind;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "===== Final stats for r/{} ({}) =====",
        snapshot.subreddit,
        kind.plural()
    );
    let _ = writeln!(out, "Total {}: {}", kind.plural(), snapshot.total_count);
    let _ = writeln!(
        out,
        "Most active author: {}",
        describe_author(snapshot.most_active_author.as_ref(), kind.plural())
    );
    let _ = writeln!(
        out,
        "Most recent {}: {}",
        kind.label(),
        describe_item(snapshot.most_recent_item.as_ref())
    );
    let _ = writeln!(
        out,
        "Most upvoted {}: {}",
        kind.label(),
        describe_signal(snapshot.top_positive.as_ref(), |i| i.positive_signal, "upvotes")
    );
    let _ = writeln!(
        out,
        "Most downvoted {}: {}",
        kind.label(),
        describe_signal(snapshot.top_negative.as_ref(), |i| i.negative_signal, "downvotes")
    );

    out
}

/// Mid-stream report: total, most active author and top upvoted item.
pub fn render_quick_stats(snapshot: &AggregatorSnapshot) -> String {
    let kind = snapshot.kind;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "----- Quick stats for r/{} ({}) -----",
        snapshot.subreddit,
        kind.plural()
    );
    let _ = writeln!(out, "Total {}: {}", kind.plural(), snapshot.total_count);
    let _ = writeln!(
        out,
        "Most active author: {}",
        describe_author(snapshot.most_active_author.as_ref(), kind.plural())
    );
    let _ = writeln!(
        out,
        "Most upvoted {}: {}",
        kind.label(),
        describe_signal(snapshot.top_positive.as_ref(), |i| i.positive_signal, "upvotes")
    );

    out
}
