//! Comments, replies and per-comment likes.

use log::{debug, warn};

use crate::{
    config::Limits,
    errors::{ServiceResult, ValidationError},
    id::generate_document_id,
    keys::{self, CollectionPath},
    models::{AuthorView, CommentDoc, CommentView},
    store::{Direction, DocumentStore, Fields, Query, WriteBatch},
    time::format_clock,
    users::UserDirectory,
};

pub struct CommentService<'a, S> {
    store: &'a S,
    limits: &'a Limits,
}

fn validate_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single("text", "required", "Yorum boş olamaz."));
    }
    Ok(trimmed.to_string())
}

impl<'a, S: DocumentStore> CommentService<'a, S> {
    pub fn new(store: &'a S, limits: &'a Limits) -> Self {
        Self { store, limits }
    }

    /// Comments on a recommendation, newest first, with their authors resolved.
    pub async fn list(&self, recommendation_id: &str) -> ServiceResult<Vec<CommentView>> {
        self.list_in(keys::comments(recommendation_id), Direction::Desc).await
    }

    /// Replies under a comment in conversation order (oldest first).
    pub async fn list_replies(&self, recommendation_id: &str, comment_id: &str) -> ServiceResult<Vec<CommentView>> {
        self.list_in(keys::replies(recommendation_id, comment_id), Direction::Asc)
            .await
    }

    /// Adds a comment and returns its id so callers can insert it locally.
    pub async fn add(&self, recommendation_id: &str, user_id: &str, text: &str) -> ServiceResult<String> {
        self.append(keys::comments(recommendation_id), user_id, text).await
    }

    pub async fn add_reply(
        &self,
        recommendation_id: &str,
        comment_id: &str,
        user_id: &str,
        text: &str,
    ) -> ServiceResult<String> {
        self.append(keys::replies(recommendation_id, comment_id), user_id, text)
            .await
    }

    /// Removes a comment together with its likes and replies.
    pub async fn delete(&self, recommendation_id: &str, comment_id: &str) -> ServiceResult<()> {
        let likes = self
            .store
            .query(&Query::collection(keys::comment_likes(recommendation_id, comment_id)))
            .await?;
        let replies = self
            .store
            .query(&Query::collection(keys::replies(recommendation_id, comment_id)))
            .await?;

        let mut batch = WriteBatch::new();
        for doc in likes.into_iter().chain(replies) {
            batch.delete(doc.path);
        }
        batch.delete(keys::comment(recommendation_id, comment_id));
        debug!("deleting comment {comment_id} with {} dependent record(s)", batch.len() - 1);
        self.store.commit(batch).await?;
        Ok(())
    }

    pub async fn like(&self, recommendation_id: &str, comment_id: &str, user_id: &str) -> ServiceResult<()> {
        self.store
            .set(keys::comment_likes(recommendation_id, comment_id).doc(user_id), Fields::created_now())
            .await?;
        Ok(())
    }

    pub async fn unlike(&self, recommendation_id: &str, comment_id: &str, user_id: &str) -> ServiceResult<()> {
        self.store
            .delete(keys::comment_likes(recommendation_id, comment_id).doc(user_id))
            .await?;
        Ok(())
    }

    pub async fn is_liked(&self, recommendation_id: &str, comment_id: &str, user_id: &str) -> ServiceResult<bool> {
        Ok(self
            .store
            .exists(&keys::comment_likes(recommendation_id, comment_id).doc(user_id))
            .await?)
    }

    /// Like count of one comment from a full read.
    pub async fn like_count(&self, recommendation_id: &str, comment_id: &str) -> ServiceResult<usize> {
        Ok(self
            .store
            .count(&keys::comment_likes(recommendation_id, comment_id))
            .await?)
    }

    /// Number of comments on a recommendation from a full read.
    pub async fn count(&self, recommendation_id: &str) -> ServiceResult<usize> {
        Ok(self.store.count(&keys::comments(recommendation_id)).await?)
    }

    async fn append(&self, collection: CollectionPath, user_id: &str, text: &str) -> ServiceResult<String> {
        let text = validate_text(text)?;
        let id = generate_document_id();
        let fields = Fields::new()
            .with("text", text)
            .with("userId", user_id)
            .server_timestamp("createdAt");
        self.store.set(collection.doc(&id), fields).await?;
        Ok(id)
    }

    async fn list_in(&self, collection: CollectionPath, direction: Direction) -> ServiceResult<Vec<CommentView>> {
        let docs = self
            .store
            .query(&Query::collection(collection).order_by("createdAt", direction))
            .await?;

        let mut comments = Vec::with_capacity(docs.len());
        for doc in &docs {
            match doc.decode::<CommentDoc>() {
                Ok(comment) => comments.push((doc.id.clone(), comment)),
                Err(err) => warn!("skipping malformed comment {}: {err}", doc.path),
            }
        }

        let profiles = UserDirectory::new(self.store, self.limits)
            .get_profiles(comments.iter().map(|(_, c)| c.user_id.clone()))
            .await;

        Ok(comments
            .into_iter()
            .map(|(id, comment)| {
                let author = profiles
                    .get(&comment.user_id)
                    .map(|profile| profile.author_view())
                    .unwrap_or_else(|| AuthorView::unknown(&comment.user_id));
                CommentView {
                    id,
                    text: comment.text,
                    user_id: comment.user_id,
                    author,
                    time: format_clock(comment.created_at),
                    created_at: comment.created_at,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::ServiceError, store::MemoryStore};

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let store = MemoryStore::new();
        let limits = Limits::default();
        let comments = CommentService::new(&store, &limits);

        let err = comments.add("r1", "u1", "   \n").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn lists_newest_first_with_unknown_authors() {
        let store = MemoryStore::new();
        let limits = Limits::default();
        let comments = CommentService::new(&store, &limits);

        comments.add("r1", "ghost", " ilk ").await.unwrap();
        comments.add("r1", "ghost", "ikinci").await.unwrap();
        let listed = comments.list("r1").await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["ikinci", "ilk"]);
        assert_eq!(listed[0].author.name, "Bilinmeyen Kullanıcı");
        assert_eq!(listed[0].time.len(), 5);
        assert_eq!(comments.count("r1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn replies_are_readable_oldest_first() {
        let store = MemoryStore::new();
        let limits = Limits::default();
        let comments = CommentService::new(&store, &limits);

        let parent = comments.add("r1", "u1", "soru").await.unwrap();
        comments.add_reply("r1", &parent, "u2", "cevap 1").await.unwrap();
        comments.add_reply("r1", &parent, "u3", "cevap 2").await.unwrap();

        let replies = comments.list_replies("r1", &parent).await.unwrap();
        let texts: Vec<&str> = replies.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["cevap 1", "cevap 2"]);
        assert_eq!(comments.count("r1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn comment_likes_and_delete() {
        let store = MemoryStore::new();
        let limits = Limits::default();
        let comments = CommentService::new(&store, &limits);

        let id = comments.add("r1", "u1", "güzel").await.unwrap();
        comments.add_reply("r1", &id, "u2", "katılıyorum").await.unwrap();
        comments.like("r1", &id, "u2").await.unwrap();
        comments.like("r1", &id, "u2").await.unwrap();
        assert_eq!(comments.like_count("r1", &id).await.unwrap(), 1);
        assert!(comments.is_liked("r1", &id, "u2").await.unwrap());

        comments.unlike("r1", &id, "u2").await.unwrap();
        assert!(!comments.is_liked("r1", &id, "u2").await.unwrap());

        comments.like("r1", &id, "u3").await.unwrap();
        comments.delete("r1", &id).await.unwrap();
        assert!(store.is_empty());
    }
}
