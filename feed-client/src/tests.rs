#[cfg(test)]
mod tests {
    use crate::{ItemFeed, Listing, ReplayFeed};
    use serde_json::json;
    use std::env;
    use std::time::Duration;
    use subwatch_core::{CoreError, FeedError, ItemKind};

    fn post_child(id: &str, author: &str, ups: i64, created: f64) -> serde_json::Value {
        json!({
            "kind": "t3",
            "data": {
                "id": id,
                "title": format!("Post {id}"),
                "selftext": "",
                "author": author,
                "subreddit": "rust",
                "created_utc": created,
                "ups": ups,
                "downs": 0,
                "is_self": false
            }
        })
    }

    fn page(children: Vec<serde_json::Value>) -> String {
        json!({ "kind": "Listing", "data": { "children": children, "after": null } }).to_string()
    }

    fn capture() -> String {
        [
            page(vec![post_child("a", "alice", 3, 1700000000.0)]),
            page(vec![
                post_child("a", "alice", 4, 1700000000.0),
                post_child("b", "bob", 1, 1700000060.0),
            ]),
            page(vec![
                post_child("b", "bob", 2, 1700000060.0),
                post_child("c", "carol", 7, 1700000120.0),
            ]),
        ]
        .join("\n")
    }

    #[test]
    fn test_listing_conversion() {
        let raw = page(vec![
            post_child("p1", "alice", 12, 1700000000.0),
            json!({
                "kind": "t1",
                "data": {
                    "id": "c1",
                    "body": "a comment",
                    "author": "[deleted]",
                    "subreddit": "rust",
                    "link_id": "t3_p1",
                    "link_title": "Post p1",
                    "created_utc": 1700000030.0,
                    "ups": 2,
                    "downs": 5
                }
            }),
            json!({ "kind": "more", "data": { "count": 4 } }),
            json!({ "kind": "t3", "data": { "id": 42 } }),
        ]);

        let listing = Listing::from_json("rust", &raw).unwrap();
        let posts = listing.clone().into_items(ItemKind::Post);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "p1");
        assert_eq!(posts[0].author(), Some("alice"));
        assert_eq!(posts[0].positive_signal, 12);
        assert_eq!(posts[0].title.as_deref(), Some("Post p1"));
        assert_eq!(posts[0].created_at.timestamp(), 1700000000);

        let comments = listing.into_items(ItemKind::Comment);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author(), None);
        assert_eq!(comments[0].negative_signal, 5);
        assert_eq!(comments[0].preview_text(), "a comment");
        let parent = comments[0].parent.as_ref().unwrap();
        assert_eq!(parent.id, "p1");
        assert_eq!(parent.title.as_deref(), Some("Post p1"));
    }

    #[test]
    fn test_invalid_listing_is_reported() {
        let result = Listing::from_json("rust", "{not json");
        assert!(matches!(
            result,
            Err(CoreError::Feed(FeedError::InvalidListing { .. }))
        ));
    }

    #[test]
    fn test_fetch_recent_returns_baseline() {
        let feed = ReplayFeed::from_jsonl("rust", &capture(), Duration::from_secs(1)).unwrap();
        assert_eq!(feed.page_count(), 3);
        assert_eq!(feed.subreddit(), "rust");

        let baseline = tokio_test::block_on(feed.fetch_recent(ItemKind::Post)).unwrap();
        let ids: Vec<_> = baseline.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        let comments = tokio_test::block_on(feed.fetch_recent(ItemKind::Comment)).unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_skips_baseline_ids_only() {
        let feed = ReplayFeed::from_jsonl("rust", &capture(), Duration::from_secs(1)).unwrap();
        let mut batches = feed.subscribe(ItemKind::Post).await.unwrap();
        assert!(feed.is_subscribed());

        let first = batches.recv().await.unwrap();
        let ids: Vec<_> = first.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);

        // "b" comes back with its newer vote count.
        let second = batches.recv().await.unwrap();
        let ids: Vec<_> = second.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(second[0].positive_signal, 2);

        feed.unsubscribe().await.unwrap();
        assert!(!feed.is_subscribed());
        assert!(batches.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_stops_delivery_and_is_idempotent() {
        let feed = ReplayFeed::from_jsonl("rust", &capture(), Duration::from_secs(30)).unwrap();
        let mut batches = feed.subscribe(ItemKind::Post).await.unwrap();

        feed.unsubscribe().await.unwrap();
        feed.unsubscribe().await.unwrap();

        assert!(batches.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_double_subscribe_is_rejected() {
        let feed = ReplayFeed::from_jsonl("rust", &capture(), Duration::from_secs(1)).unwrap();
        let _batches = feed.subscribe(ItemKind::Post).await.unwrap();

        let second = feed.subscribe(ItemKind::Post).await;
        assert!(matches!(
            second,
            Err(CoreError::Feed(FeedError::SubscriptionFailed { .. }))
        ));
        feed.unsubscribe().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_capture_is_exhausted() {
        let feed = ReplayFeed::from_jsonl("rust", "\n\n", Duration::from_secs(1)).unwrap();
        let result = feed.fetch_recent(ItemKind::Post).await;
        assert!(matches!(
            result,
            Err(CoreError::Feed(FeedError::ReplayExhausted { .. }))
        ));
    }

    #[tokio::test]
    async fn test_open_from_directory() {
        let dir = env::temp_dir().join(format!("subwatch_replay_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("rust.jsonl"), capture()).unwrap();

        let feed = ReplayFeed::open(&dir, "rust", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(feed.page_count(), 3);

        let missing = ReplayFeed::open(&dir, "golang", Duration::from_secs(1)).await;
        assert!(matches!(
            missing,
            Err(CoreError::Feed(FeedError::SubredditNotFound { .. }))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
