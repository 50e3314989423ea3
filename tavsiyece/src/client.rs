use log::warn;

use crate::{
    avatar::placeholder_avatar,
    comments::CommentService,
    config::TavsiyeceConfig,
    errors::ServiceResult,
    feed::FeedAssembler,
    graph::SocialGraph,
    keys,
    models::{CommentDoc, UNKNOWN_USER_NAME},
    notifications::{Actor, NotificationDispatcher, NotificationEmitter, NotificationInbox, notification_channel},
    recommendations::RecommendationStore,
    search::SearchAggregator,
    store::{DocumentStore, RedisStore},
    users::UserDirectory,
};

/// Entry point bundling a store, its configuration and the notification queue.
///
/// Service handles borrow the client, so they are cheap to create per call.
pub struct Tavsiyece<S> {
    store: S,
    config: TavsiyeceConfig,
    notifications: NotificationEmitter,
}

impl<S: DocumentStore + Clone> Tavsiyece<S> {
    /// Builds a client and the dispatcher that must be driven to deliver
    /// its notifications.
    pub fn new(store: S, config: TavsiyeceConfig) -> (Self, NotificationDispatcher<S>) {
        let (notifications, dispatcher) = notification_channel(store.clone());
        (
            Self {
                store,
                config,
                notifications,
            },
            dispatcher,
        )
    }
}

impl Tavsiyece<RedisStore> {
    /// Connects to the Redis backend named by `config`.
    pub async fn connect(config: &TavsiyeceConfig) -> ServiceResult<(Self, NotificationDispatcher<RedisStore>)> {
        let store = RedisStore::connect(&config.redis_url(), config.store.prefix.clone()).await?;
        Ok(Self::new(store, config.clone()))
    }
}

impl<S: DocumentStore> Tavsiyece<S> {
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &TavsiyeceConfig {
        &self.config
    }

    pub fn users(&self) -> UserDirectory<'_, S> {
        UserDirectory::new(&self.store, &self.config.limits)
    }

    pub fn graph(&self) -> SocialGraph<'_, S> {
        SocialGraph::new(&self.store, &self.config.limits)
    }

    pub fn recommendations(&self) -> RecommendationStore<'_, S> {
        RecommendationStore::new(&self.store, &self.config.limits)
    }

    pub fn comments(&self) -> CommentService<'_, S> {
        CommentService::new(&self.store, &self.config.limits)
    }

    pub fn feed(&self) -> FeedAssembler<'_, S> {
        FeedAssembler::new(&self.store, &self.config)
    }

    pub fn search(&self) -> SearchAggregator<'_, S> {
        SearchAggregator::new(&self.store, &self.config.limits)
    }

    pub fn inbox(&self) -> NotificationInbox<'_, S> {
        NotificationInbox::new(&self.store)
    }

    pub fn notifications(&self) -> &NotificationEmitter {
        &self.notifications
    }

    /// Follows and, when a new edge was written, notifies the followee.
    pub async fn follow_and_notify(&self, follower_id: &str, followee_id: &str) -> ServiceResult<bool> {
        let followed = self.graph().follow(follower_id, followee_id).await?;
        if followed {
            let actor = self.actor(follower_id).await;
            self.notifications.emit_follow(followee_id, &actor);
        }
        Ok(followed)
    }

    /// Likes and notifies the recommendation's author.
    pub async fn like_and_notify(&self, user_id: &str, recommendation_id: &str) -> ServiceResult<()> {
        self.recommendations().like(user_id, recommendation_id).await?;
        match self.recommendations().get(recommendation_id).await {
            Ok(Some(rec)) => {
                let actor = self.actor(user_id).await;
                self.notifications
                    .emit_like(recommendation_id, &rec.doc.user_id, &actor, rec.doc.image.as_deref());
            }
            Ok(None) => warn!("liked recommendation {recommendation_id} not found; no notification"),
            Err(err) => warn!("skipping like notification for {recommendation_id}: {err}"),
        }
        Ok(())
    }

    /// Comments and notifies the recommendation's author; returns the comment id.
    pub async fn comment_and_notify(&self, recommendation_id: &str, user_id: &str, text: &str) -> ServiceResult<String> {
        let comment_id = self.comments().add(recommendation_id, user_id, text).await?;
        match self.recommendations().get(recommendation_id).await {
            Ok(Some(rec)) => {
                let actor = self.actor(user_id).await;
                self.notifications.emit_comment(
                    recommendation_id,
                    &rec.doc.user_id,
                    &actor,
                    text.trim(),
                    rec.doc.image.as_deref(),
                );
            }
            Ok(None) => warn!("commented recommendation {recommendation_id} not found; no notification"),
            Err(err) => warn!("skipping comment notification for {recommendation_id}: {err}"),
        }
        Ok(comment_id)
    }

    /// Replies and notifies the parent comment's author; returns the reply id.
    pub async fn reply_and_notify(
        &self,
        recommendation_id: &str,
        comment_id: &str,
        user_id: &str,
        text: &str,
    ) -> ServiceResult<String> {
        let reply_id = self
            .comments()
            .add_reply(recommendation_id, comment_id, user_id, text)
            .await?;

        let parent = match self.store.get(&keys::comment(recommendation_id, comment_id)).await {
            Ok(Some(doc)) => doc.decode::<CommentDoc>().ok(),
            Ok(None) => None,
            Err(err) => {
                warn!("skipping reply notification for {comment_id}: {err}");
                return Ok(reply_id);
            }
        };
        let Some(parent) = parent else {
            warn!("parent comment {comment_id} not found; no notification");
            return Ok(reply_id);
        };
        let image = match self.recommendations().get(recommendation_id).await {
            Ok(rec) => rec.and_then(|rec| rec.doc.image),
            Err(_) => None,
        };
        let actor = self.actor(user_id).await;
        self.notifications
            .emit_reply(recommendation_id, &parent.user_id, &actor, text.trim(), image.as_deref());
        Ok(reply_id)
    }

    async fn actor(&self, user_id: &str) -> Actor {
        match self.users().get_profile(user_id).await {
            Some(profile) => Actor::from(&profile),
            None => Actor::new(user_id, UNKNOWN_USER_NAME, placeholder_avatar(Some(UNKNOWN_USER_NAME), None)),
        }
    }
}
