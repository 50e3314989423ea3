use super::support::*;
use tavsiyece::OptimisticToggle;

#[tokio::test]
async fn like_then_unlike_restores_count() {
    let (app, _dispatcher) = app();
    register(&app, "owner", "sahip").await;
    register(&app, "fan", "hayran").await;
    let rec = post(&app, "owner", "Kitap önerisi", "Kitap").await;
    let recommendations = app.recommendations();

    let before = recommendations.like_count(&rec).await.unwrap();
    recommendations.like("fan", &rec).await.unwrap();
    assert_eq!(recommendations.like_count(&rec).await.unwrap(), before + 1);
    assert!(recommendations.is_liked("fan", &rec).await.unwrap());
    assert_eq!(recommendations.liked_ids("fan").await.unwrap(), vec![rec.clone()]);

    recommendations.unlike("fan", &rec).await.unwrap();
    assert_eq!(recommendations.like_count(&rec).await.unwrap(), before);
    assert!(!recommendations.is_liked("fan", &rec).await.unwrap());
    assert!(recommendations.liked_ids("fan").await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_like_leaves_neither_side_written() {
    let (app, _dispatcher) = app();
    register(&app, "owner", "sahip").await;
    let rec = post(&app, "owner", "Film", "Film").await;
    app.store()
        .fail_path("users/fan/likedRecommendations", InjectedFailure::PermissionDenied);

    let err = app.recommendations().like("fan", &rec).await.unwrap_err();
    assert!(matches!(err, ServiceError::Permission { .. }));
    app.store().clear_failures();
    assert_eq!(app.recommendations().like_count(&rec).await.unwrap(), 0);
}

#[tokio::test]
async fn optimistic_like_rolls_back_on_failure() {
    let (app, _dispatcher) = app();
    register(&app, "owner", "sahip").await;
    let rec = post(&app, "owner", "Film", "Film").await;
    let (app, rec) = (&app, rec.as_str());
    let mut toggle = OptimisticToggle::new(false);

    app.store().fail_path(format!("recommendations/{rec}/likes"), InjectedFailure::Unavailable);
    let result = toggle
        .run(|liked| async move {
            if liked {
                app.recommendations().like("fan", rec).await
            } else {
                app.recommendations().unlike("fan", rec).await
            }
        })
        .await;
    assert!(matches!(result, Some(Err(ServiceError::Transient { .. }))));
    assert!(!toggle.value());

    app.store().clear_failures();
    let result = toggle
        .run(|liked| async move {
            assert!(liked);
            app.recommendations().like("fan", rec).await
        })
        .await;
    assert!(matches!(result, Some(Ok(()))));
    assert!(toggle.value());
    assert!(app.recommendations().is_liked("fan", rec).await.unwrap());
}

#[tokio::test]
async fn comments_and_replies() {
    let (app, _dispatcher) = app();
    register(&app, "owner", "sahip").await;
    register(&app, "fan", "hayran").await;
    let rec = post(&app, "owner", "Film", "Film").await;
    let comments = app.comments();

    let err = comments.add(&rec, "fan", "   ").await.unwrap_err();
    assert_eq!(err.user_message(), "Yorum boş olamaz.");

    let first = comments.add(&rec, "fan", "İlk yorum").await.unwrap();
    let second = comments.add(&rec, "owner", "  Teşekkürler  ").await.unwrap();
    let listed = comments.list(&rec).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);
    assert_eq!(listed[0].text, "Teşekkürler");
    assert_eq!(listed[0].author.username, "sahip");

    let reply_a = comments.add_reply(&rec, &first, "owner", "Cevap 1").await.unwrap();
    let reply_b = comments.add_reply(&rec, &first, "fan", "Cevap 2").await.unwrap();
    let replies = comments.list_replies(&rec, &first).await.unwrap();
    let ids: Vec<&str> = replies.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![reply_a.as_str(), reply_b.as_str()]);

    comments.like(&rec, &first, "owner").await.unwrap();
    assert!(comments.is_liked(&rec, &first, "owner").await.unwrap());
    assert_eq!(comments.like_count(&rec, &first).await.unwrap(), 1);
    assert_eq!(comments.count(&rec).await.unwrap(), 2);

    comments.delete(&rec, &first).await.unwrap();
    assert_eq!(comments.count(&rec).await.unwrap(), 1);
    assert_eq!(app.store().count_under(&format!("recommendations/{rec}/comments/{first}")), 0);
}

#[tokio::test]
async fn invalid_rating_is_rejected() {
    let (app, _dispatcher) = app();
    let err = app
        .recommendations()
        .create(
            "owner",
            NewRecommendation {
                title: "Film".to_string(),
                text: String::new(),
                category: "Film".to_string(),
                image: None,
                rating: Some(7.5),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(app.store().count_under("recommendations"), 0);
}
