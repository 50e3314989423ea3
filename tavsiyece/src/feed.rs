//! Home, profile and saved feeds.

use std::collections::HashSet;

use futures::{future::join_all, join};
use log::{debug, warn};

use crate::{
    config::{FeedOrdering, TavsiyeceConfig},
    errors::ServiceResult,
    graph::SocialGraph,
    keys,
    models::{AuthorView, FeedItem, Recommendation},
    recommendations::{RecommendationStore, to_recommendation},
    store::{Direction, DocumentStore, Query, id_chunks},
    users::UserDirectory,
};

/// Result of building the home feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    Items(Vec<FeedItem>),
    /// The viewer follows nobody and has not posted.
    NoFollowing,
    /// The viewer follows someone but nobody in the audience has posted.
    NoPosts,
}

impl FeedOutcome {
    pub fn items(&self) -> &[FeedItem] {
        match self {
            FeedOutcome::Items(items) => items,
            FeedOutcome::NoFollowing | FeedOutcome::NoPosts => &[],
        }
    }
}

pub struct FeedAssembler<'a, S> {
    store: &'a S,
    config: &'a TavsiyeceConfig,
}

impl<'a, S: DocumentStore> FeedAssembler<'a, S> {
    pub fn new(store: &'a S, config: &'a TavsiyeceConfig) -> Self {
        Self { store, config }
    }

    /// Recent recommendations by the viewer and everyone they follow.
    pub async fn build_home_feed(&self, viewer_id: &str) -> ServiceResult<FeedOutcome> {
        let limits = &self.config.limits;
        let following = SocialGraph::new(self.store, limits)
            .following_ids(viewer_id, limits.following_scan)
            .await?;
        let follows_anyone = following.iter().any(|id| id != viewer_id);

        let mut audience: HashSet<String> = following.iter().cloned().collect();
        audience.insert(viewer_id.to_string());

        // The viewer leads the first chunk, followed by edges newest first.
        let ordered = std::iter::once(viewer_id.to_string()).chain(following);
        let queries: Vec<Query> = id_chunks(ordered, limits.batch_lookup)
            .into_iter()
            .map(|chunk| {
                Query::collection(keys::recommendations())
                    .where_in("userId", chunk)
                    .order_by("createdAt", Direction::Desc)
                    .limit(limits.feed_per_chunk)
            })
            .collect();
        debug!("home feed for {viewer_id}: {} author chunk(s)", queries.len());

        let results = join_all(queries.iter().map(|query| self.store.query(query))).await;
        let mut candidates = Vec::new();
        for result in results {
            candidates.extend(result?.iter().filter_map(to_recommendation));
        }

        if candidates.is_empty() {
            return Ok(if follows_anyone {
                FeedOutcome::NoPosts
            } else {
                FeedOutcome::NoFollowing
            });
        }

        candidates.retain(|rec| audience.contains(&rec.doc.user_id));
        let mut items = self.hydrate(viewer_id, candidates).await;
        if self.config.feed.ordering == FeedOrdering::Chronological {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(FeedOutcome::Items(items))
    }

    /// Everything `author_id` posted, newest first, as seen by the viewer.
    pub async fn build_profile_feed(&self, viewer_id: &str, author_id: &str) -> ServiceResult<Vec<FeedItem>> {
        let recs = RecommendationStore::new(self.store, &self.config.limits)
            .list_by_author(author_id, None)
            .await?;
        Ok(self.hydrate(viewer_id, recs).await)
    }

    /// The viewer's saved recommendations, most recently saved first.
    pub async fn build_saved_feed(&self, viewer_id: &str) -> ServiceResult<Vec<FeedItem>> {
        let recommendations = RecommendationStore::new(self.store, &self.config.limits);
        let ids = recommendations.saved_ids(viewer_id).await?;
        let recs = recommendations.get_many(&ids).await?;
        Ok(self.hydrate(viewer_id, recs).await)
    }

    /// Attaches authors, the viewer's like state, and engagement counts.
    async fn hydrate(&self, viewer_id: &str, recs: Vec<Recommendation>) -> Vec<FeedItem> {
        if recs.is_empty() {
            return Vec::new();
        }
        let limits = &self.config.limits;
        let users = UserDirectory::new(self.store, limits);
        let recommendations = RecommendationStore::new(self.store, limits);

        let (profiles, liked) = join!(
            users.get_profiles(recs.iter().map(|rec| rec.doc.user_id.clone())),
            recommendations.liked_ids(viewer_id),
        );
        let liked: HashSet<String> = match liked {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                warn!("liked ids for {viewer_id} unavailable: {err}");
                HashSet::new()
            }
        };

        let counts = join_all(recs.iter().map(|rec| self.engagement_counts(&rec.id))).await;

        recs.into_iter()
            .zip(counts)
            .map(|(rec, (like_count, comment_count))| {
                let author = profiles
                    .get(&rec.doc.user_id)
                    .map(|profile| profile.author_view())
                    .unwrap_or_else(|| AuthorView::unknown(&rec.doc.user_id));
                FeedItem {
                    is_liked: liked.contains(&rec.id),
                    id: rec.id,
                    title: rec.doc.title,
                    text: rec.doc.text,
                    category: rec.doc.category,
                    user_id: rec.doc.user_id,
                    image: rec.doc.image,
                    rating: rec.doc.rating,
                    author,
                    like_count,
                    comment_count,
                    created_at: rec.doc.created_at,
                }
            })
            .collect()
    }

    /// Like and comment counts; a failed count reads as zero.
    async fn engagement_counts(&self, recommendation_id: &str) -> (usize, usize) {
        let likes_path = keys::recommendation_likes(recommendation_id);
        let comments_path = keys::comments(recommendation_id);
        let (likes, comments) = join!(self.store.count(&likes_path), self.store.count(&comments_path));
        let likes = likes.unwrap_or_else(|err| {
            warn!("like count for {recommendation_id} failed: {err}");
            0
        });
        let comments = comments.unwrap_or_else(|err| {
            warn!("comment count for {recommendation_id} failed: {err}");
            0
        });
        (likes, comments)
    }
}
