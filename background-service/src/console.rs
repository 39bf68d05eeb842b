use std::sync::Arc;
use subwatch_core::{format_timestamp, short_preview, ItemKind, ItemRecord};

/// Called once for every item as it is ingested. Observers only watch;
/// they never influence the statistics.
pub type ItemObserver = Arc<dyn Fn(&ItemRecord) + Send + Sync>;

/// One live console line: author, id, short preview, timestamp.
pub fn format_item_line(item: &ItemRecord, preview_chars: usize) -> String {
    let preview = short_preview(item.preview_text(), preview_chars);
    let location = match (&item.kind, &item.parent) {
        (ItemKind::Comment, Some(parent)) => format!("r/{} on {}", item.subreddit, parent.id),
        _ => format!("r/{}", item.subreddit),
    };

    format!(
        "[{}] {} | {} | \"{}\" | {}",
        location,
        item.display_author(),
        item.id,
        preview,
        format_timestamp(&item.created_at)
    )
}

/// Observer that writes each item to stdout.
pub fn console_echo(preview_chars: usize) -> ItemObserver {
    Arc::new(move |item: &ItemRecord| {
        println!("{}", format_item_line(item, preview_chars));
    })
}
