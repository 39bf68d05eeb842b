#[cfg(test)]
mod tests {
    use crate::{Aggregator, AuthorActivity, NONE_AVAILABLE};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::thread;
    use subwatch_core::{ItemKind, ItemRecord};

    fn post(id: &str, author: &str, pos: u64, neg: u64, minute: u32) -> ItemRecord {
        ItemRecord::new(
            id,
            ItemKind::Post,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
        )
        .with_author(author)
        .with_title(format!("title of {id}"))
        .with_signals(pos, neg)
        .with_subreddit("rust")
    }

    fn scenario_items() -> Vec<ItemRecord> {
        vec![
            post("p1", "alice", 5, 0, 0),
            post("p2", "bob", 9, 1, 5),
            post("p3", "alice", 2, 0, 10),
        ]
    }

    #[test]
    fn test_reference_scenario() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(scenario_items());

        assert_eq!(aggregator.total_count(), 3);
        assert_eq!(
            aggregator.most_active_author(),
            Some(AuthorActivity {
                author: "alice".to_string(),
                count: 2
            })
        );
        assert_eq!(aggregator.most_recent_item().unwrap().id, "p3");
        assert_eq!(aggregator.item_with_max_positive_signal().unwrap().id, "p2");
        assert_eq!(aggregator.item_with_max_negative_signal().unwrap().id, "p2");
    }

    #[test]
    fn test_empty_aggregator_reports_none() {
        let aggregator = Aggregator::new("rust", ItemKind::Comment);

        assert_eq!(aggregator.total_count(), 0);
        assert!(aggregator.most_active_author().is_none());
        assert!(aggregator.most_recent_item().is_none());
        assert!(aggregator.item_with_max_positive_signal().is_none());
        assert!(aggregator.item_with_max_negative_signal().is_none());

        let summary = aggregator.render_summary();
        assert!(summary.contains("Total comments: 0"));
        assert!(summary.contains(&format!("Most active author: {NONE_AVAILABLE}")));
        assert!(summary.contains(&format!("Most recent comment: {NONE_AVAILABLE}")));
        assert!(summary.contains(&format!("Most upvoted comment: {NONE_AVAILABLE}")));
        assert!(summary.contains(&format!("Most downvoted comment: {NONE_AVAILABLE}")));
    }

    #[test]
    fn test_batch_boundaries_do_not_matter() {
        let split = Aggregator::new("rust", ItemKind::Post);
        let mut items = scenario_items();
        let last = items.split_off(2);
        split.ingest_batch(items);
        split.ingest_batch(last);

        let whole = Aggregator::new("rust", ItemKind::Post);
        whole.ingest_batch(scenario_items());

        assert_eq!(split.total_count(), whole.total_count());
        assert_eq!(split.render_summary(), whole.render_summary());
    }

    #[test]
    fn test_empty_batch_changes_nothing() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(scenario_items());
        let before = aggregator.render_summary();

        aggregator.ingest_batch(Vec::new());

        assert_eq!(aggregator.total_count(), 3);
        assert_eq!(aggregator.render_summary(), before);
    }

    #[test]
    fn test_signal_overwrites_instead_of_summing() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(vec![post("a", "alice", 6, 0, 0), post("b", "bob", 8, 0, 1)]);
        // A later observation of "a" with a lower count must not be added to the first one.
        aggregator.ingest_batch(vec![post("a", "alice", 4, 0, 0)]);

        let top = aggregator.item_with_max_positive_signal().unwrap();
        assert_eq!(top.id, "b");
        assert_eq!(top.positive_signal, 8);

        aggregator.ingest_batch(vec![post("a", "alice", 12, 0, 0)]);
        let top = aggregator.item_with_max_positive_signal().unwrap();
        assert_eq!(top.id, "a");
        assert_eq!(top.positive_signal, 12);
    }

    #[test]
    fn test_zero_reobservation_keeps_prior_signal() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(vec![post("a", "alice", 7, 3, 0).with_title("original")]);
        aggregator.ingest_batch(vec![post("a", "alice", 0, 0, 0).with_title("edited")]);

        let top = aggregator.item_with_max_positive_signal().unwrap();
        assert_eq!(top.positive_signal, 7);
        assert_eq!(top.title.as_deref(), Some("original"));

        let bottom = aggregator.item_with_max_negative_signal().unwrap();
        assert_eq!(bottom.negative_signal, 3);
        assert_eq!(bottom.title.as_deref(), Some("original"));

        assert_eq!(aggregator.total_count(), 2);
        assert_eq!(
            aggregator.most_recent_item().unwrap().title.as_deref(),
            Some("edited")
        );
    }

    #[test]
    fn test_author_tie_goes_to_earliest_first_item() {
        for _ in 0..20 {
            let aggregator = Aggregator::new("rust", ItemKind::Post);
            aggregator.ingest_batch(vec![
                post("1", "zed", 0, 0, 0),
                post("2", "amy", 0, 0, 1),
                post("3", "amy", 0, 0, 2),
                post("4", "zed", 0, 0, 3),
            ]);
            assert_eq!(aggregator.most_active_author().unwrap().author, "zed");
        }
    }

    #[test]
    fn test_signal_tie_goes_to_earliest_id() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(vec![
            post("first", "a", 7, 3, 0),
            post("second", "b", 7, 3, 1),
            post("third", "c", 2, 1, 2),
        ]);

        assert_eq!(aggregator.item_with_max_positive_signal().unwrap().id, "first");
        assert_eq!(aggregator.item_with_max_negative_signal().unwrap().id, "first");
    }

    #[test]
    fn test_most_recent_uses_arrival_order() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(vec![post("late", "a", 0, 0, 30)]);
        aggregator.ingest_batch(vec![post("early", "b", 0, 0, 1)]);

        assert_eq!(aggregator.most_recent_item().unwrap().id, "early");
    }

    #[test]
    fn test_positive_and_negative_are_tracked_independently() {
        let aggregator = Aggregator::new("rust", ItemKind::Comment);
        aggregator.ingest_batch(vec![
            post("liked", "a", 50, 0, 0),
            post("disliked", "b", 0, 20, 1),
        ]);

        assert_eq!(aggregator.item_with_max_positive_signal().unwrap().id, "liked");
        assert_eq!(aggregator.item_with_max_negative_signal().unwrap().id, "disliked");
    }

    #[test]
    fn test_zero_signals_are_not_leaders() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(vec![post("quiet", "a", 0, 0, 0)]);

        assert_eq!(aggregator.total_count(), 1);
        assert!(aggregator.item_with_max_positive_signal().is_none());
        assert!(aggregator.item_with_max_negative_signal().is_none());
    }

    #[test]
    fn test_missing_author_and_id_are_skipped_per_dimension() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        let mut anonymous = post("anon", "x", 3, 0, 0);
        anonymous.author = None;
        let unnamed = post("", "carol", 99, 99, 1);

        aggregator.ingest_batch(vec![anonymous, unnamed]);

        assert_eq!(aggregator.total_count(), 2);
        assert_eq!(aggregator.most_active_author().unwrap().author, "carol");
        assert_eq!(aggregator.item_with_max_positive_signal().unwrap().id, "anon");
        assert!(aggregator.item_with_max_negative_signal().is_none());
        assert_eq!(aggregator.most_recent_item().unwrap().id, "");
    }

    #[test]
    fn test_summary_lines() {
        let aggregator = Aggregator::new("rust", ItemKind::Post);
        aggregator.ingest_batch(scenario_items());

        let summary = aggregator.render_summary();
        assert!(summary.starts_with("===== Final stats for r/rust (posts) ====="));
        assert!(summary.contains("Total posts: 3"));
        assert!(summary.contains("Most active author: alice (2 posts)"));
        assert!(summary.contains("Most recent post: p3 by alice at 05/01/2024 10:10:00"));
        assert!(summary.contains("Most upvoted post: p2 by bob"));
        assert!(summary.contains("(9 upvotes)"));
        assert!(summary.contains("(1 downvotes)"));
        assert!(!summary.contains(NONE_AVAILABLE));

        let quick = aggregator.render_quick_stats();
        assert!(quick.contains("Quick stats for r/rust"));
        assert!(quick.contains("Total posts: 3"));
        assert!(!quick.contains("Most recent"));
    }

    #[test]
    fn test_concurrent_ingest_and_query() {
        let aggregator = Arc::new(Aggregator::new("rust", ItemKind::Comment));

        let writers: Vec<_> = (0..4)
            .map(|worker| {
                let aggregator = Arc::clone(&aggregator);
                thread::spawn(move || {
                    for n in 0..50 {
                        let id = format!("w{worker}-{n}");
                        aggregator.ingest_batch(vec![post(&id, "shared", n, 0, 0)]);
                    }
                })
            })
            .collect();

        let reader = {
            let aggregator = Arc::clone(&aggregator);
            thread::spawn(move || {
                for _ in 0..50 {
                    let snapshot = aggregator.snapshot();
                    if let Some(author) = snapshot.most_active_author {
                        assert_eq!(author.count as usize, snapshot.total_count);
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(aggregator.total_count(), 200);
        assert_eq!(aggregator.most_active_author().unwrap().count, 200);
        assert_eq!(
            aggregator.item_with_max_positive_signal().unwrap().positive_signal,
            49
        );
    }
}
