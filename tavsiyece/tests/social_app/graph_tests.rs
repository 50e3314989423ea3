use super::support::*;

#[tokio::test]
async fn follow_writes_both_sides() {
    let (app, _dispatcher) = app();
    register(&app, "a", "ayse").await;
    register(&app, "b", "burak").await;

    follow(&app, "a", "b").await;

    let graph = app.graph();
    assert!(graph.is_following("a", "b").await.unwrap());
    assert!(!graph.is_following("b", "a").await.unwrap());
    assert_eq!(graph.following_ids("a", 10).await.unwrap(), vec!["b".to_string()]);
    assert_eq!(graph.follower_ids("b", 10).await.unwrap(), vec!["a".to_string()]);
    assert_eq!(graph.follower_count("b").await.unwrap(), 1);
    assert_eq!(graph.following_count("a").await.unwrap(), 1);

    assert!(graph.unfollow("a", "b").await.unwrap());
    assert!(!graph.is_following("a", "b").await.unwrap());
    assert_eq!(graph.follower_count("b").await.unwrap(), 0);
    assert_eq!(app.store().count_under("users/a/following"), 0);
    assert_eq!(app.store().count_under("users/b/followers"), 0);
}

#[tokio::test]
async fn self_follow_is_a_no_op() {
    let (app, mut dispatcher) = app();
    register(&app, "a", "ayse").await;

    assert!(!app.follow_and_notify("a", "a").await.unwrap());
    assert!(!app.graph().unfollow("a", "a").await.unwrap());
    assert_eq!(app.graph().following_count("a").await.unwrap(), 0);
    assert_eq!(dispatcher.process_pending().await, 0);
}

#[tokio::test]
async fn follower_lists_are_hydrated_and_skip_unknown_users() {
    let (app, _dispatcher) = app();
    register(&app, "target", "hedef").await;
    register(&app, "f1", "birinci").await;
    register(&app, "f2", "ikinci").await;
    follow(&app, "f1", "target").await;
    follow(&app, "ghost", "target").await;
    follow(&app, "f2", "target").await;

    let followers = app.graph().list_followers("target", 5).await.unwrap();
    let ids: Vec<&str> = followers.iter().map(|user| user.id.as_str()).collect();
    assert_eq!(ids, vec!["f2", "f1"]);
    assert_eq!(followers[0].username, "ikinci");
    assert!(!followers[0].avatar.is_empty());

    let following = app.graph().list_following("f1", 5).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].name, "hedef Test");
}

#[tokio::test]
async fn profiles_load_across_lookup_chunks() {
    let (app, _dispatcher) = app();
    let ids: Vec<String> = (0..23).map(|i| format!("user{i:02}")).collect();
    for id in &ids {
        register(&app, id, id).await;
    }

    let mut requested = ids.clone();
    requested.push("missing".to_string());
    requested.push(ids[0].clone());
    let profiles = app.users().get_profiles(requested.iter().cloned()).await;

    assert_eq!(profiles.len(), ids.len());
    assert!(ids.iter().all(|id| profiles.contains_key(id)));
    assert!(!profiles.contains_key("missing"));
}
