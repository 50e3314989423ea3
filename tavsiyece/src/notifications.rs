//! Notification fan-in.
//!
//! [`NotificationEmitter`] composes a notification and queues it;
//! [`NotificationDispatcher`] drains the queue into the target user's
//! `notifications` collection. Delivery is best-effort: a failed write is
//! logged and dropped, and never affects the action that triggered it.

use chrono::Utc;
use log::{debug, warn};
use tokio::sync::mpsc;

use crate::{
    avatar::resolve_avatar,
    errors::ServiceResult,
    id::generate_document_id,
    keys,
    models::{NotificationDoc, NotificationKind, NotificationView, Profile},
    store::{Direction, DocumentStore, Fields, Query, WriteBatch},
    text::truncate_quote,
    time::format_relative,
};

const RECOMMENDATION_LINK_PREFIX: &str = "/recommendation/";
const PROFILE_LINK_PREFIX: &str = "/profile/";

/// Snapshot of the user who triggered a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

impl From<&Profile> for Actor {
    fn from(profile: &Profile) -> Self {
        Self::new(profile.id.clone(), profile.display_name(), profile.avatar())
    }
}

/// A composed notification waiting for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingNotification {
    pub target_id: String,
    pub kind: NotificationKind,
    pub sender: Actor,
    pub message: String,
    pub link: String,
    pub image_url: Option<String>,
}

impl OutgoingNotification {
    fn fields(&self) -> Fields {
        Fields::new()
            .with("type", self.kind.as_str())
            .with("senderId", self.sender.id.as_str())
            .with("senderName", self.sender.name.as_str())
            .with("senderPhotoURL", self.sender.avatar.as_str())
            .with("message", self.message.as_str())
            .with("link", self.link.as_str())
            .with("imageUrl", self.image_url.clone())
            .with("isRead", false)
            .server_timestamp("createdAt")
    }
}

/// Creates a connected emitter/dispatcher pair writing into `store`.
pub fn notification_channel<S>(store: S) -> (NotificationEmitter, NotificationDispatcher<S>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (NotificationEmitter { sender }, NotificationDispatcher { store, receiver })
}

/// Queues notifications. Each `emit_*` returns whether one was queued; a
/// self-action queues nothing.
#[derive(Debug, Clone)]
pub struct NotificationEmitter {
    sender: mpsc::UnboundedSender<OutgoingNotification>,
}

impl NotificationEmitter {
    pub fn emit_like(
        &self,
        recommendation_id: &str,
        owner_id: &str,
        actor: &Actor,
        recommendation_image: Option<&str>,
    ) -> bool {
        self.enqueue(OutgoingNotification {
            target_id: owner_id.to_string(),
            kind: NotificationKind::Like,
            sender: actor.clone(),
            message: "tavsiyeni beğendi.".to_string(),
            link: format!("{RECOMMENDATION_LINK_PREFIX}{recommendation_id}"),
            image_url: recommendation_image.map(str::to_string),
        })
    }

    pub fn emit_comment(
        &self,
        recommendation_id: &str,
        owner_id: &str,
        actor: &Actor,
        comment_text: &str,
        recommendation_image: Option<&str>,
    ) -> bool {
        self.enqueue(OutgoingNotification {
            target_id: owner_id.to_string(),
            kind: NotificationKind::Comment,
            sender: actor.clone(),
            message: format!("tavsiyene yorum yaptı: \"{}\"", truncate_quote(comment_text)),
            link: format!("{RECOMMENDATION_LINK_PREFIX}{recommendation_id}"),
            image_url: recommendation_image.map(str::to_string),
        })
    }

    pub fn emit_reply(
        &self,
        recommendation_id: &str,
        parent_comment_owner_id: &str,
        actor: &Actor,
        reply_text: &str,
        recommendation_image: Option<&str>,
    ) -> bool {
        self.enqueue(OutgoingNotification {
            target_id: parent_comment_owner_id.to_string(),
            kind: NotificationKind::Reply,
            sender: actor.clone(),
            message: format!("yorumuna yanıt verdi: \"{}\"", truncate_quote(reply_text)),
            link: format!("{RECOMMENDATION_LINK_PREFIX}{recommendation_id}"),
            image_url: recommendation_image.map(str::to_string),
        })
    }

    pub fn emit_follow(&self, followee_id: &str, actor: &Actor) -> bool {
        self.enqueue(OutgoingNotification {
            target_id: followee_id.to_string(),
            kind: NotificationKind::Follow,
            sender: actor.clone(),
            message: "seni takip etmeye başladı.".to_string(),
            link: format!("{PROFILE_LINK_PREFIX}{}", actor.id),
            image_url: None,
        })
    }

    fn enqueue(&self, notification: OutgoingNotification) -> bool {
        if notification.target_id == notification.sender.id {
            debug!("suppressing self-notification for {}", notification.target_id);
            return false;
        }
        match self.sender.send(notification) {
            Ok(()) => true,
            Err(mpsc::error::SendError(notification)) => {
                warn!(
                    "notification dispatcher is gone; dropping {:?} for {}",
                    notification.kind, notification.target_id
                );
                false
            }
        }
    }
}

/// Writes queued notifications to the store.
pub struct NotificationDispatcher<S> {
    store: S,
    receiver: mpsc::UnboundedReceiver<OutgoingNotification>,
}

impl<S: DocumentStore> NotificationDispatcher<S> {
    /// Delivers until every emitter is dropped; returns how many were written.
    pub async fn run(mut self) -> usize {
        let mut delivered = 0;
        while let Some(notification) = self.receiver.recv().await {
            if self.deliver(notification).await {
                delivered += 1;
            }
        }
        debug!("notification dispatcher stopped after {delivered} deliveries");
        delivered
    }

    /// Delivers whatever is queued right now without waiting for more.
    pub async fn process_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(notification) = self.receiver.try_recv() {
            if self.deliver(notification).await {
                delivered += 1;
            }
        }
        delivered
    }

    async fn deliver(&self, notification: OutgoingNotification) -> bool {
        let path = keys::notifications(&notification.target_id).doc(&generate_document_id());
        match self.store.set(path, notification.fields()).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "dropping {:?} notification for {}: {err}",
                    notification.kind, notification.target_id
                );
                false
            }
        }
    }
}

/// Recipient-side reads and read-state updates.
pub struct NotificationInbox<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> NotificationInbox<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Marks one notification read. A missing notification is left alone
    /// and reported as `false`.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> ServiceResult<bool> {
        let path = keys::notifications(user_id).doc(notification_id);
        let Some(doc) = self.store.get(&path).await? else {
            return Ok(false);
        };
        let fields = Fields::from_record(&doc.fields)?.with("isRead", true);
        let mut batch = WriteBatch::new();
        batch.merge(path, fields);
        self.store.commit(batch).await?;
        Ok(true)
    }

    /// Marks every notification read in one batch; returns how many were touched.
    pub async fn mark_all_read(&self, user_id: &str) -> ServiceResult<usize> {
        let docs = self
            .store
            .query(&Query::collection(keys::notifications(user_id)))
            .await?;
        if docs.is_empty() {
            return Ok(0);
        }
        let mut batch = WriteBatch::new();
        for doc in docs {
            batch.update(doc.path, Fields::new().with("isRead", true));
        }
        let touched = batch.len();
        self.store.commit(batch).await?;
        Ok(touched)
    }

    /// Newest notifications first, at most `limit`.
    pub async fn list(&self, user_id: &str, limit: usize) -> ServiceResult<Vec<NotificationView>> {
        let query = Query::collection(keys::notifications(user_id))
            .order_by("createdAt", Direction::Desc)
            .limit(limit);
        let docs = self.store.query(&query).await?;
        let now = Utc::now();

        let mut views = Vec::with_capacity(docs.len());
        for doc in docs {
            let notification: NotificationDoc = match doc.decode() {
                Ok(notification) => notification,
                Err(err) => {
                    warn!("skipping malformed notification {}: {err}", doc.path);
                    continue;
                }
            };
            views.push(NotificationView {
                id: doc.id,
                kind: notification.kind,
                sender_avatar: resolve_avatar(
                    notification.sender_photo_url.as_deref(),
                    Some(notification.sender_name.as_str()),
                    None,
                ),
                sender_id: notification.sender_id,
                sender_name: notification.sender_name,
                message: notification.message,
                recommendation_id: notification
                    .link
                    .strip_prefix(RECOMMENDATION_LINK_PREFIX)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
                link: notification.link,
                image_url: notification.image_url,
                is_read: notification.is_read,
                time: format_relative(notification.created_at, now),
                created_at: notification.created_at,
            });
        }
        Ok(views)
    }

    pub async fn unread_count(&self, user_id: &str) -> ServiceResult<usize> {
        let query = Query::collection(keys::notifications(user_id)).where_eq("isRead", false);
        Ok(self.store.query(&query).await?.len())
    }
}
