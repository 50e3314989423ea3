use super::support::*;

#[tokio::test]
async fn self_like_emits_nothing() {
    let (app, mut dispatcher) = app();
    register(&app, "owner", "sahip").await;
    let rec = post(&app, "owner", "Kendi filmim", "Film").await;

    app.like_and_notify("owner", &rec).await.unwrap();
    assert_eq!(dispatcher.process_pending().await, 0);
    assert!(app.inbox().list("owner", 20).await.unwrap().is_empty());
}

#[tokio::test]
async fn like_notifies_the_author() {
    let (app, mut dispatcher) = app();
    register(&app, "owner", "sahip").await;
    register(&app, "fan", "hayran").await;
    let rec = post(&app, "owner", "Film", "Film").await;

    app.like_and_notify("fan", &rec).await.unwrap();
    assert_eq!(dispatcher.process_pending().await, 1);

    let inbox = app.inbox().list("owner", 20).await.unwrap();
    assert_eq!(inbox.len(), 1);
    let notification = &inbox[0];
    assert_eq!(notification.kind, NotificationKind::Like);
    assert_eq!(notification.sender_id, "fan");
    assert_eq!(notification.sender_name, "hayran Test");
    assert_eq!(notification.recommendation_id.as_deref(), Some(rec.as_str()));
    assert_eq!(notification.image_url.as_deref(), Some("https://cdn.example/owner.jpg"));
    assert!(!notification.is_read);
    assert_eq!(notification.time, "şimdi");
}

#[tokio::test]
async fn comment_and_reply_notify_their_targets() {
    let (app, mut dispatcher) = app();
    register(&app, "owner", "sahip").await;
    register(&app, "fan", "hayran").await;
    let rec = post(&app, "owner", "Film", "Film").await;

    let comment = app.comment_and_notify(&rec, "fan", "Çok iyi").await.unwrap();
    app.reply_and_notify(&rec, &comment, "owner", "Teşekkürler").await.unwrap();
    assert_eq!(dispatcher.process_pending().await, 2);

    let owner_inbox = app.inbox().list("owner", 20).await.unwrap();
    assert_eq!(owner_inbox.len(), 1);
    assert_eq!(owner_inbox[0].kind, NotificationKind::Comment);
    assert!(owner_inbox[0].message.contains("Çok iyi"));

    let fan_inbox = app.inbox().list("fan", 20).await.unwrap();
    assert_eq!(fan_inbox.len(), 1);
    assert_eq!(fan_inbox[0].kind, NotificationKind::Reply);
}

#[tokio::test]
async fn follow_notification_links_to_the_follower() {
    let (app, mut dispatcher) = app();
    register(&app, "a", "ayse").await;
    register(&app, "b", "burak").await;

    assert!(app.follow_and_notify("a", "b").await.unwrap());
    assert_eq!(dispatcher.process_pending().await, 1);

    let inbox = app.inbox().list("b", 20).await.unwrap();
    assert_eq!(inbox[0].kind, NotificationKind::Follow);
    assert_eq!(inbox[0].link, "/profile/a");
    assert_eq!(inbox[0].recommendation_id, None);
}

#[tokio::test]
async fn delivery_failure_does_not_fail_the_action() {
    let (app, mut dispatcher) = app();
    register(&app, "owner", "sahip").await;
    register(&app, "fan", "hayran").await;
    let rec = post(&app, "owner", "Film", "Film").await;
    app.store()
        .fail_path("users/owner/notifications", InjectedFailure::PermissionDenied);

    app.like_and_notify("fan", &rec).await.unwrap();
    assert_eq!(dispatcher.process_pending().await, 0);
    assert!(app.recommendations().is_liked("fan", &rec).await.unwrap());
}

#[tokio::test]
async fn run_drains_after_the_client_is_dropped() {
    let (app, dispatcher) = app();
    register(&app, "a", "ayse").await;
    register(&app, "b", "burak").await;
    register(&app, "c", "cem").await;
    app.follow_and_notify("a", "c").await.unwrap();
    app.follow_and_notify("b", "c").await.unwrap();

    let store = app.store().clone();
    drop(app);
    assert_eq!(dispatcher.run().await, 2);
    assert_eq!(store.count_under("users/c/notifications"), 2);
}

#[tokio::test]
async fn read_state_updates() {
    let (app, mut dispatcher) = app();
    for (id, name) in [("a", "ayse"), ("b", "burak"), ("c", "cem")] {
        register(&app, id, name).await;
    }
    app.follow_and_notify("a", "c").await.unwrap();
    app.follow_and_notify("b", "c").await.unwrap();
    dispatcher.process_pending().await;

    let inbox = app.inbox();
    assert_eq!(inbox.unread_count("c").await.unwrap(), 2);

    let newest = inbox.list("c", 20).await.unwrap()[0].id.clone();
    assert!(inbox.mark_read("c", &newest).await.unwrap());
    assert!(!inbox.mark_read("c", "missing").await.unwrap());
    assert_eq!(inbox.unread_count("c").await.unwrap(), 1);

    let listed = inbox.list("c", 20).await.unwrap();
    assert!(listed[0].is_read);
    assert!(!listed[1].is_read);
    assert_eq!(listed[0].sender_id, "b");

    assert_eq!(inbox.mark_all_read("c").await.unwrap(), 2);
    assert_eq!(inbox.unread_count("c").await.unwrap(), 0);
    assert_eq!(inbox.mark_all_read("nobody").await.unwrap(), 0);
}
