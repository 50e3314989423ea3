use super::support::*;

#[tokio::test]
async fn empty_states_distinguish_following_nobody_from_no_posts() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    register(&app, "quiet", "sessiz").await;

    assert_eq!(app.feed().build_home_feed("viewer").await.unwrap(), FeedOutcome::NoFollowing);

    follow(&app, "viewer", "quiet").await;
    assert_eq!(app.feed().build_home_feed("viewer").await.unwrap(), FeedOutcome::NoPosts);
}

#[tokio::test]
async fn home_feed_only_contains_viewer_and_followed_authors() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    register(&app, "friend", "arkadas").await;
    register(&app, "stranger", "yabanci").await;
    follow(&app, "viewer", "friend").await;

    let own = post(&app, "viewer", "Kendi tavsiyem", "Kitap").await;
    let friends = post(&app, "friend", "Arkadaş tavsiyesi", "Film").await;
    post(&app, "stranger", "Yabancı tavsiyesi", "Müzik").await;

    let outcome = app.feed().build_home_feed("viewer").await.unwrap();
    let ids: Vec<&str> = outcome.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&own.as_str()));
    assert!(ids.contains(&friends.as_str()));

    let friend_item = outcome.items().iter().find(|item| item.id == friends).unwrap();
    assert_eq!(friend_item.author.username, "arkadas");
    assert_eq!(friend_item.author.name, "arkadas Test");
}

#[tokio::test]
async fn viewer_only_feed_without_follows_still_shows_own_posts() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    let own = post(&app, "viewer", "Tek başıma", "Kitap").await;

    let outcome = app.feed().build_home_feed("viewer").await.unwrap();
    assert_eq!(outcome.items().len(), 1);
    assert_eq!(outcome.items()[0].id, own);
}

#[tokio::test]
async fn feed_spans_more_followees_than_one_lookup_allows() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    let mut expected = Vec::new();
    for i in 0..25 {
        let id = format!("author{i:02}");
        register(&app, &id, &id).await;
        follow(&app, "viewer", &id).await;
        expected.push(post(&app, &id, &format!("Tavsiye {i}"), "Kitap").await);
    }

    let outcome = app.feed().build_home_feed("viewer").await.unwrap();
    let mut ids: Vec<String> = outcome.items().iter().map(|item| item.id.clone()).collect();
    ids.sort();
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn unknown_author_renders_placeholder() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    follow(&app, "viewer", "deleted").await;
    post(&app, "deleted", "Sahipsiz", "Kitap").await;

    let outcome = app.feed().build_home_feed("viewer").await.unwrap();
    let item = &outcome.items()[0];
    assert_eq!(item.author.name, "Bilinmeyen Kullanıcı");
    assert_eq!(item.author.username, "bilinmeyen");
    assert!(!item.author.avatar.is_empty());
}

#[tokio::test]
async fn chronological_ordering_sorts_newest_first() {
    let mut config = TavsiyeceConfig::default();
    config.feed.ordering = FeedOrdering::Chronological;
    let (app, _dispatcher) = app_with(config);
    register(&app, "viewer", "izleyici").await;
    register(&app, "friend", "arkadas").await;
    follow(&app, "viewer", "friend").await;

    let first = post(&app, "viewer", "Eski", "Kitap").await;
    let second = post(&app, "friend", "Orta", "Film").await;
    let third = post(&app, "viewer", "Yeni", "Kitap").await;

    let outcome = app.feed().build_home_feed("viewer").await.unwrap();
    let ids: Vec<&str> = outcome.items().iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec![third.as_str(), second.as_str(), first.as_str()]);
}

#[tokio::test]
async fn feed_items_carry_like_state_and_counts() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    register(&app, "friend", "arkadas").await;
    follow(&app, "viewer", "friend").await;
    let rec = post(&app, "friend", "Güzel kafe", "Mekan").await;

    app.recommendations().like("viewer", &rec).await.unwrap();
    app.recommendations().like("friend", &rec).await.unwrap();
    app.comments().add(&rec, "viewer", "Gidecegim").await.unwrap();

    let outcome = app.feed().build_home_feed("viewer").await.unwrap();
    let item = &outcome.items()[0];
    assert!(item.is_liked);
    assert_eq!(item.like_count, 2);
    assert_eq!(item.comment_count, 1);
    assert_eq!(item.rating, Some(4.0));
}

#[tokio::test]
async fn failed_counts_read_as_zero() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    let rec = post(&app, "viewer", "Bozuk sayaç", "Kitap").await;
    app.comments().add(&rec, "viewer", "yorum").await.unwrap();
    app.store()
        .fail_path(format!("recommendations/{rec}/comments"), InjectedFailure::Unavailable);

    let outcome = app.feed().build_home_feed("viewer").await.unwrap();
    assert_eq!(outcome.items()[0].comment_count, 0);
}

#[tokio::test]
async fn saved_and_profile_feeds() {
    let (app, _dispatcher) = app();
    register(&app, "viewer", "izleyici").await;
    register(&app, "author", "yazar").await;
    let older = post(&app, "author", "Birinci", "Kitap").await;
    let newer = post(&app, "author", "İkinci", "Kitap").await;

    let profile = app.feed().build_profile_feed("viewer", "author").await.unwrap();
    let ids: Vec<&str> = profile.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec![newer.as_str(), older.as_str()]);

    app.recommendations().save("viewer", &older).await.unwrap();
    app.recommendations().save("viewer", &newer).await.unwrap();
    app.recommendations().unsave("viewer", &newer).await.unwrap();
    let saved = app.feed().build_saved_feed("viewer").await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, older);
}
