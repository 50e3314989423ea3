//! Follow edges.
//!
//! Every edge is stored twice: `users/{follower}/following/{followee}` and
//! `users/{followee}/followers/{follower}`. Both mirrors are written and
//! removed in one batch, so they exist or are absent together.

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::{
    config::Limits,
    errors::ServiceResult,
    keys::{self, CollectionPath},
    models::{FollowUser, MarkerDoc},
    store::{Direction, DocumentStore, Fields, Query, WriteBatch},
    users::UserDirectory,
};

pub struct SocialGraph<'a, S> {
    store: &'a S,
    limits: &'a Limits,
}

impl<'a, S: DocumentStore> SocialGraph<'a, S> {
    pub fn new(store: &'a S, limits: &'a Limits) -> Self {
        Self { store, limits }
    }

    /// Creates the edge. Returns `false` without writing for a self-follow.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> ServiceResult<bool> {
        if follower_id == followee_id {
            debug!("ignoring self-follow by {follower_id}");
            return Ok(false);
        }
        let mut batch = WriteBatch::new();
        batch
            .set(keys::following(follower_id).doc(followee_id), Fields::created_now())
            .set(keys::followers(followee_id).doc(follower_id), Fields::created_now());
        self.store.commit(batch).await?;
        info!("{follower_id} followed {followee_id}");
        Ok(true)
    }

    /// Removes the edge. Returns `false` without writing for a self-unfollow.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> ServiceResult<bool> {
        if follower_id == followee_id {
            return Ok(false);
        }
        let mut batch = WriteBatch::new();
        batch
            .delete(keys::following(follower_id).doc(followee_id))
            .delete(keys::followers(followee_id).doc(follower_id));
        self.store.commit(batch).await?;
        info!("{follower_id} unfollowed {followee_id}");
        Ok(true)
    }

    pub async fn is_following(&self, viewer_id: &str, target_id: &str) -> ServiceResult<bool> {
        Ok(self.store.exists(&keys::following(viewer_id).doc(target_id)).await?)
    }

    /// When the follow edge was created, or `None` without an edge.
    pub async fn followed_at(&self, follower_id: &str, followee_id: &str) -> ServiceResult<Option<DateTime<Utc>>> {
        let edge = self.store.get(&keys::following(follower_id).doc(followee_id)).await?;
        match edge {
            Some(doc) => Ok(doc.decode::<MarkerDoc>()?.created_at),
            None => Ok(None),
        }
    }

    /// Ids the user follows, newest edge first, at most `limit`.
    pub async fn following_ids(&self, user_id: &str, limit: usize) -> ServiceResult<Vec<String>> {
        self.edge_ids(keys::following(user_id), limit).await
    }

    pub async fn follower_ids(&self, user_id: &str, limit: usize) -> ServiceResult<Vec<String>> {
        self.edge_ids(keys::followers(user_id), limit).await
    }

    pub async fn list_followers(&self, user_id: &str, limit: usize) -> ServiceResult<Vec<FollowUser>> {
        let ids = self.follower_ids(user_id, limit).await?;
        Ok(self.hydrate(ids).await)
    }

    pub async fn list_following(&self, user_id: &str, limit: usize) -> ServiceResult<Vec<FollowUser>> {
        let ids = self.following_ids(user_id, limit).await?;
        Ok(self.hydrate(ids).await)
    }

    pub async fn follower_count(&self, user_id: &str) -> ServiceResult<usize> {
        Ok(self.store.count(&keys::followers(user_id)).await?)
    }

    pub async fn following_count(&self, user_id: &str) -> ServiceResult<usize> {
        Ok(self.store.count(&keys::following(user_id)).await?)
    }

    async fn edge_ids(&self, collection: CollectionPath, limit: usize) -> ServiceResult<Vec<String>> {
        let query = Query::collection(collection)
            .order_by("createdAt", Direction::Desc)
            .limit(limit);
        Ok(self.store.query(&query).await?.into_iter().map(|doc| doc.id).collect())
    }

    /// Resolves edge ids in edge order; ids without a profile are dropped.
    async fn hydrate(&self, ids: Vec<String>) -> Vec<FollowUser> {
        let profiles = UserDirectory::new(self.store, self.limits)
            .get_profiles(ids.iter().cloned())
            .await;
        ids.iter()
            .filter_map(|id| profiles.get(id))
            .map(FollowUser::from)
            .collect()
    }
}
