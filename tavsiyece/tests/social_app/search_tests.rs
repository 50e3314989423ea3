use super::support::*;

async fn results(app: &App, query: &str) -> tavsiyece::SearchResults {
    match app.search().search(query).await {
        SearchOutcome::Results(results) => results,
        SearchOutcome::Inactive => panic!("query {query:?} should be active"),
    }
}

#[tokio::test]
async fn blank_query_is_inactive() {
    let (app, _dispatcher) = app();
    assert!(matches!(app.search().search("   ").await, SearchOutcome::Inactive));
}

#[tokio::test]
async fn keyword_search_ignores_case_and_diacritics() {
    let (app, _dispatcher) = app();
    register(&app, "a", "ayse").await;
    let coffee = post(&app, "a", "Kahve", "Yeme-İçme").await;
    post(&app, "a", "Çay bahçesi", "Mekan").await;

    let found = results(&app, "kahve").await;
    assert_eq!(found.recommendations.len(), 1);
    assert_eq!(found.recommendations[0].id, coffee);
    assert_eq!(found.recommendations[0].title, "Kahve");

    let found = results(&app, "CAY").await;
    assert_eq!(found.recommendations.len(), 1);
    assert_eq!(found.recommendations[0].title, "Çay bahçesi");

    assert!(results(&app, "otomobil").await.is_empty());
}

#[tokio::test]
async fn multi_word_query_requires_every_word() {
    let (app, _dispatcher) = app();
    register(&app, "a", "ayse").await;
    let both = post_with_text(&app, "a", "Film gecesi", "Harika bir bilim kurgu", "Film").await;
    post_with_text(&app, "a", "Bilim kitabı", "Popüler bilim", "Kitap").await;

    let found = results(&app, "bilim film").await;
    let ids: Vec<&str> = found.recommendations.iter().map(|rec| rec.id.as_str()).collect();
    assert_eq!(ids, vec![both.as_str()]);
}

#[tokio::test]
async fn username_prefix_search() {
    let (app, _dispatcher) = app();
    register(&app, "u1", "Şebnem").await;
    register(&app, "u2", "sebahat").await;
    register(&app, "u3", "selin").await;

    let found = results(&app, "seb").await;
    let names: Vec<&str> = found.users.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, vec!["sebahat", "Şebnem"]);
    assert!(found.failures.is_empty());
}

#[tokio::test]
async fn a_failing_section_does_not_hide_the_other() {
    let (app, _dispatcher) = app();
    register(&app, "u1", "kahveci").await;
    post(&app, "u1", "Kahve", "Yeme-İçme").await;
    app.store().fail_path("users", InjectedFailure::IndexMissing);

    let found = results(&app, "kahve").await;
    assert_eq!(found.recommendations.len(), 1);
    assert!(found.users.is_empty());
    assert_eq!(found.failures.len(), 1);
    assert_eq!(found.failures[0].section, SearchSection::Users);
    assert!(found.failures[0].error.is_index_missing());
    assert_eq!(
        found.failures[0].error.user_message(),
        "Arama dizini oluşturuluyor. Lütfen daha sonra tekrar deneyin."
    );
}

#[tokio::test]
async fn results_are_capped() {
    let (app, _dispatcher) = app();
    register(&app, "u1", "yazar").await;
    for i in 0..15 {
        post(&app, "u1", &format!("Kahve {i}"), "Yeme-İçme").await;
    }
    let found = results(&app, "kahve").await;
    assert_eq!(found.recommendations.len(), TavsiyeceConfig::default().limits.search_results);
}

#[tokio::test]
async fn whole_category_query_matches_unsplit_keyword() {
    let (app, _dispatcher) = app();
    register(&app, "u1", "yazar").await;
    let coffee = post_with_text(&app, "u1", "Kahve", "Sabah", "Yeme-İçme").await;
    post_with_text(&app, "u1", "Yeme alışkanlıkları", "Sağlıklı beslenme", "Sağlık").await;

    let found = results(&app, "Yeme-İçme").await;
    let ids: Vec<&str> = found.recommendations.iter().map(|rec| rec.id.as_str()).collect();
    assert_eq!(ids, vec![coffee.as_str()]);

    let found = results(&app, "kahve sabah").await;
    assert_eq!(found.recommendations.len(), 1);
    assert_eq!(found.recommendations[0].id, coffee);
}
