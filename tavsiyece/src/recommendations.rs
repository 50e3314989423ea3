//! Recommendation records and their engagement markers.

use std::collections::HashMap;

use futures::future::join_all;
use log::{info, warn};

use crate::{
    config::Limits,
    errors::{ServiceResult, ValidationError, ValidationIssue},
    keys,
    models::{Category, CategoryDoc, Recommendation, RecommendationDoc},
    store::{Direction, Document, DocumentStore, Fields, Query, WriteBatch, id_chunks},
    text::{keywords, normalize},
};

const MAX_RATING: f64 = 5.0;

/// Input for [`RecommendationStore::create`].
#[derive(Debug, Clone, Default)]
pub struct NewRecommendation {
    pub title: String,
    pub text: String,
    pub category: String,
    pub image: Option<String>,
    pub rating: Option<f64>,
}

pub struct RecommendationStore<'a, S> {
    store: &'a S,
    limits: &'a Limits,
}

pub(crate) fn to_recommendation(doc: &Document) -> Option<Recommendation> {
    match doc.decode::<RecommendationDoc>() {
        Ok(rec) => Some(Recommendation {
            id: doc.id.clone(),
            doc: rec,
        }),
        Err(err) => {
            warn!("skipping malformed recommendation {}: {err}", doc.path);
            None
        }
    }
}

impl NewRecommendation {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        for (field, value) in [("title", &self.title), ("text", &self.text), ("category", &self.category)] {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    field,
                    "required",
                    "Tüm alanlar zorunludur (Başlık, Detay, Kategori).",
                ));
            }
        }
        if let Some(rating) = self.rating
            && !(0.0..=MAX_RATING).contains(&rating)
        {
            issues.push(ValidationIssue::new("rating", "out_of_range", "Puan 0 ile 5 arasında olmalıdır."));
        }
        ValidationError::new(issues).into_result()
    }
}

impl<'a, S: DocumentStore> RecommendationStore<'a, S> {
    pub fn new(store: &'a S, limits: &'a Limits) -> Self {
        Self { store, limits }
    }

    /// Stores a new recommendation with its search keys and returns its id.
    pub async fn create(&self, author_id: &str, input: NewRecommendation) -> ServiceResult<String> {
        input.validate()?;

        let id = crate::id::generate_document_id();
        let title_lowercase = normalize(&input.title);
        let fields = Fields::new()
            .with("title", input.title.as_str())
            .with("text", input.text.as_str())
            .with("category", input.category.as_str())
            .with("userId", author_id)
            .with("image", input.image.clone())
            .with("rating", input.rating.unwrap_or(0.0))
            .with("source", "app")
            .with("title_lowercase", title_lowercase)
            .with("keywords", keywords(&input.title, &input.text, &input.category))
            .server_timestamp("createdAt");
        self.store.set(keys::recommendation(&id), fields).await?;
        info!("{author_id} created recommendation {id}");
        Ok(id)
    }

    pub async fn get(&self, recommendation_id: &str) -> ServiceResult<Option<Recommendation>> {
        let doc = self.store.get(&keys::recommendation(recommendation_id)).await?;
        Ok(doc.as_ref().and_then(to_recommendation))
    }

    /// Looks up many recommendations, returned in the order of `ids`.
    pub async fn get_many(&self, ids: &[String]) -> ServiceResult<Vec<Recommendation>> {
        let queries: Vec<Query> = id_chunks(ids.iter().cloned(), self.limits.batch_lookup)
            .into_iter()
            .map(|chunk| Query::collection(keys::recommendations()).where_id_in(chunk))
            .collect();
        let results = join_all(queries.iter().map(|query| self.store.query(query))).await;

        let mut found = HashMap::new();
        for result in results {
            for doc in result? {
                if let Some(rec) = to_recommendation(&doc) {
                    found.insert(rec.id.clone(), rec);
                }
            }
        }
        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    /// The author's recommendations, newest first.
    pub async fn list_by_author(&self, author_id: &str, limit: Option<usize>) -> ServiceResult<Vec<Recommendation>> {
        let mut query = Query::collection(keys::recommendations())
            .where_eq("userId", author_id)
            .order_by("createdAt", Direction::Desc);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let docs = self.store.query(&query).await?;
        Ok(docs.iter().filter_map(to_recommendation).collect())
    }

    /// Records the like and its `likedRecommendations` mirror in one batch.
    pub async fn like(&self, user_id: &str, recommendation_id: &str) -> ServiceResult<()> {
        let mut batch = WriteBatch::new();
        batch
            .set(keys::recommendation_likes(recommendation_id).doc(user_id), Fields::created_now())
            .set(keys::liked_recommendations(user_id).doc(recommendation_id), Fields::created_now());
        self.store.commit(batch).await?;
        Ok(())
    }

    pub async fn unlike(&self, user_id: &str, recommendation_id: &str) -> ServiceResult<()> {
        let mut batch = WriteBatch::new();
        batch
            .delete(keys::recommendation_likes(recommendation_id).doc(user_id))
            .delete(keys::liked_recommendations(user_id).doc(recommendation_id));
        self.store.commit(batch).await?;
        Ok(())
    }

    pub async fn save(&self, user_id: &str, recommendation_id: &str) -> ServiceResult<()> {
        self.store
            .set(keys::saved_recommendations(user_id).doc(recommendation_id), Fields::created_now())
            .await?;
        Ok(())
    }

    pub async fn unsave(&self, user_id: &str, recommendation_id: &str) -> ServiceResult<()> {
        self.store
            .delete(keys::saved_recommendations(user_id).doc(recommendation_id))
            .await?;
        Ok(())
    }

    pub async fn is_liked(&self, user_id: &str, recommendation_id: &str) -> ServiceResult<bool> {
        Ok(self
            .store
            .exists(&keys::recommendation_likes(recommendation_id).doc(user_id))
            .await?)
    }

    pub async fn is_saved(&self, user_id: &str, recommendation_id: &str) -> ServiceResult<bool> {
        Ok(self
            .store
            .exists(&keys::saved_recommendations(user_id).doc(recommendation_id))
            .await?)
    }

    /// Ids the user liked, read from the reverse index.
    pub async fn liked_ids(&self, user_id: &str) -> ServiceResult<Vec<String>> {
        let docs = self
            .store
            .query(&Query::collection(keys::liked_recommendations(user_id)))
            .await?;
        Ok(docs.into_iter().map(|doc| doc.id).collect())
    }

    /// Ids the user saved, most recently saved first.
    pub async fn saved_ids(&self, user_id: &str) -> ServiceResult<Vec<String>> {
        let query = Query::collection(keys::saved_recommendations(user_id)).order_by("createdAt", Direction::Desc);
        Ok(self.store.query(&query).await?.into_iter().map(|doc| doc.id).collect())
    }

    /// Like count from a full read of the likes collection.
    pub async fn like_count(&self, recommendation_id: &str) -> ServiceResult<usize> {
        Ok(self.store.count(&keys::recommendation_likes(recommendation_id)).await?)
    }

    pub async fn categories(&self) -> ServiceResult<Vec<Category>> {
        let query = Query::collection(keys::categories()).order_by("order", Direction::Asc);
        let docs = self.store.query(&query).await?;
        let mut categories = Vec::with_capacity(docs.len());
        for doc in docs {
            let category: CategoryDoc = doc.decode()?;
            categories.push(Category {
                id: doc.id,
                name: category.name,
                order: category.order,
            });
        }
        Ok(categories)
    }
}
