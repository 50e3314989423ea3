#![allow(dead_code)]

pub use tavsiyece::{
    FeedOrdering, FeedOutcome, MemoryStore, NotificationDispatcher, NotificationKind, SearchOutcome, SearchSection,
    ServiceError, Tavsiyece, TavsiyeceConfig,
    recommendations::NewRecommendation,
    store::InjectedFailure,
    users::NewProfile,
};

pub type App = Tavsiyece<MemoryStore>;

pub fn app() -> (App, NotificationDispatcher<MemoryStore>) {
    app_with(TavsiyeceConfig::default())
}

pub fn app_with(config: TavsiyeceConfig) -> (App, NotificationDispatcher<MemoryStore>) {
    Tavsiyece::new(MemoryStore::new(), config)
}

/// Registers `id` with a username equal to `username` and a display name derived from it.
pub async fn register(app: &App, id: &str, username: &str) {
    app.users()
        .create_profile(NewProfile {
            user_id: id.to_string(),
            email: format!("{id}@example.com"),
            name: format!("{username} Test"),
            username: username.to_string(),
        })
        .await
        .expect("create profile");
}

pub async fn post(app: &App, author: &str, title: &str, category: &str) -> String {
    post_with_text(app, author, title, "Detay", category).await
}

pub async fn post_with_text(app: &App, author: &str, title: &str, text: &str, category: &str) -> String {
    app.recommendations()
        .create(
            author,
            NewRecommendation {
                title: title.to_string(),
                text: text.to_string(),
                category: category.to_string(),
                image: Some(format!("https://cdn.example/{author}.jpg")),
                rating: Some(4.0),
            },
        )
        .await
        .expect("create recommendation")
}

pub async fn follow(app: &App, follower: &str, followee: &str) {
    assert!(app.graph().follow(follower, followee).await.expect("follow"));
}
