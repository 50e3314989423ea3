//! Runs the core flows against a live Redis server.
//!
//! Ignored by default; run with `cargo test -- --ignored` and `REDIS_URL`
//! pointing at a disposable instance.

use tavsiyece::{
    FeedOutcome, RedisStore, SearchOutcome, Tavsiyece, TavsiyeceConfig, recommendations::NewRecommendation,
    users::NewProfile,
};

async fn redis_app() -> (Tavsiyece<RedisStore>, tavsiyece::NotificationDispatcher<RedisStore>) {
    let mut config = TavsiyeceConfig::default();
    config.store.prefix = format!("tavsiyece_test_{}", uuid::Uuid::new_v4());
    Tavsiyece::connect(&config).await.expect("connect to Redis")
}

async fn register(app: &Tavsiyece<RedisStore>, id: &str) {
    app.users()
        .create_profile(NewProfile {
            user_id: id.to_string(),
            email: format!("{id}@example.com"),
            name: format!("Kullanıcı {id}"),
            username: id.to_string(),
        })
        .await
        .expect("create profile");
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn follow_post_and_search_round_trip() {
    let (app, mut dispatcher) = redis_app().await;
    register(&app, "ayse").await;
    register(&app, "burak").await;

    assert!(app.follow_and_notify("ayse", "burak").await.expect("follow"));
    let rec = app
        .recommendations()
        .create(
            "burak",
            NewRecommendation {
                title: "Kahve".to_string(),
                text: "Sabah içilecek en iyi kahve".to_string(),
                category: "Yeme-İçme".to_string(),
                image: None,
                rating: Some(5.0),
            },
        )
        .await
        .expect("create recommendation");
    app.like_and_notify("ayse", &rec).await.expect("like");
    assert_eq!(dispatcher.process_pending().await, 2);

    let outcome = app.feed().build_home_feed("ayse").await.expect("feed");
    match outcome {
        FeedOutcome::Items(items) => {
            assert_eq!(items.len(), 1);
            assert!(items[0].is_liked);
            assert_eq!(items[0].like_count, 1);
        }
        other => panic!("unexpected feed outcome {other:?}"),
    }

    match app.search().search("kahve").await {
        SearchOutcome::Results(results) => {
            assert_eq!(results.recommendations.len(), 1);
            assert!(results.failures.is_empty());
        }
        SearchOutcome::Inactive => panic!("search should be active"),
    }

    assert_eq!(app.inbox().unread_count("burak").await.expect("unread"), 2);

    let removed = app.store().cleanup().await.expect("cleanup");
    assert!(removed > 0);
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn merge_keeps_empty_arrays() {
    use tavsiyece::{
        DocumentStore, keys,
        store::{Fields, WriteBatch},
    };

    let (app, _dispatcher) = redis_app().await;
    let store = app.store();
    let path = keys::recommendation("r1");
    store
        .set(path.clone(), Fields::new().with("title", "Kahve").with("keywords", Vec::<String>::new()))
        .await
        .expect("set");

    let mut batch = WriteBatch::new();
    batch.merge(path.clone(), Fields::new().with("rating", 3.0));
    store.commit(batch).await.expect("merge");

    let doc = store.get(&path).await.expect("get").expect("document");
    assert_eq!(doc.get("keywords"), Some(&serde_json::json!([])));
    assert_eq!(doc.get("title"), Some(&serde_json::json!("Kahve")));

    store.cleanup().await.expect("cleanup");
}
