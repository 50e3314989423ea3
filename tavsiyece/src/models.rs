//! Stored document shapes and the display records built from them.
//!
//! Stored documents are read with serde defaults on every field, so a
//! record written by an older client (or by hand) still decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::avatar::resolve_avatar;

/// Username assigned to accounts created without one.
pub const PLACEHOLDER_USERNAME: &str = "bilinmeyen";

/// Shown when a user has neither a name nor a real username.
pub const UNKNOWN_USER_NAME: &str = "Bilinmeyen Kullanıcı";

/// Bio given to every new account.
pub const DEFAULT_BIO: &str = "Tavsiye Çemberi'ne yeni katıldım!";

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `users/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDoc {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub name_lowercase: Option<String>,
    pub username_lowercase: Option<String>,
    #[serde(rename = "recommendationsCount")]
    pub recommendations_count: Option<i64>,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<i64>,
    #[serde(rename = "followingCount")]
    pub following_count: Option<i64>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `recommendations/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationDoc {
    pub title: String,
    pub text: String,
    pub category: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub source: Option<String>,
    pub title_lowercase: Option<String>,
    pub keywords: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A recommendation record together with its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: String,
    #[serde(flatten)]
    pub doc: RecommendationDoc,
}

/// `recommendations/{id}/comments/{id}` and the replies below it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentDoc {
    pub text: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Notification category, stored under the vocabulary existing clients read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub enum NotificationKind {
    #[serde(rename = "Begeniler")]
    Like,
    #[serde(rename = "Yorumlar")]
    Comment,
    #[serde(rename = "Yanitlar")]
    Reply,
    #[serde(rename = "Takip")]
    Follow,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Like => "Begeniler",
            NotificationKind::Comment => "Yorumlar",
            NotificationKind::Reply => "Yanitlar",
            NotificationKind::Follow => "Takip",
            NotificationKind::Unknown => "",
        }
    }
}

/// `users/{id}/notifications/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationDoc {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "senderId")]
    pub sender_id: String,
    #[serde(rename = "senderName")]
    pub sender_name: String,
    #[serde(rename = "senderPhotoURL")]
    pub sender_photo_url: Option<String>,
    pub message: String,
    pub link: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `categories/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDoc {
    pub name: String,
    pub order: Option<i64>,
}

/// Existence marker: follow edges, likes, saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerDoc {
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A user record together with its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: String,
    #[serde(flatten)]
    pub user: UserDoc,
}

impl Profile {
    pub fn new(id: impl Into<String>, user: UserDoc) -> Self {
        Self { id: id.into(), user }
    }

    /// Name, then `@username`, then [`UNKNOWN_USER_NAME`].
    pub fn display_name(&self) -> String {
        if let Some(name) = non_empty(&self.user.name) {
            return name.to_string();
        }
        match non_empty(&self.user.username) {
            Some(username) if username != PLACEHOLDER_USERNAME => format!("@{username}"),
            _ => UNKNOWN_USER_NAME.to_string(),
        }
    }

    pub fn username(&self) -> String {
        non_empty(&self.user.username).unwrap_or(PLACEHOLDER_USERNAME).to_string()
    }

    pub fn avatar(&self) -> String {
        resolve_avatar(
            self.user.photo_url.as_deref(),
            self.user.name.as_deref(),
            self.user.username.as_deref(),
        )
    }

    pub fn author_view(&self) -> AuthorView {
        AuthorView {
            id: self.id.clone(),
            name: self.display_name(),
            username: self.username(),
            avatar: self.avatar(),
        }
    }
}

/// Author block attached to feed items and comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

impl AuthorView {
    /// Placeholder for an author id that no longer resolves.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: UNKNOWN_USER_NAME.to_string(),
            username: PLACEHOLDER_USERNAME.to_string(),
            avatar: resolve_avatar(None, Some(UNKNOWN_USER_NAME), None),
        }
    }
}

/// Entry in a follower or following list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FollowUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

impl From<&Profile> for FollowUser {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.display_name(),
            username: profile.username(),
            avatar: profile.avatar(),
        }
    }
}

/// User row in search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResult {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

impl From<&Profile> for UserResult {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.display_name(),
            username: profile.username(),
            avatar: profile.avatar(),
        }
    }
}

/// Recommendation row in search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image: Option<String>,
}

impl RecommendationResult {
    pub fn new(id: impl Into<String>, doc: &RecommendationDoc) -> Self {
        Self {
            id: id.into(),
            title: doc.title.clone(),
            category: doc.category.clone(),
            image: doc.image.clone(),
        }
    }
}

/// Display-ready recommendation card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub text: String,
    pub category: String,
    pub user_id: String,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub author: AuthorView,
    pub is_liked: bool,
    pub like_count: usize,
    pub comment_count: usize,
    pub created_at: Option<DateTime<Utc>>,
}

/// Display-ready comment or reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub author: AuthorView,
    pub created_at: Option<DateTime<Utc>>,
    /// `HH:MM`, or "şimdi" while the server timestamp is pending.
    pub time: String,
}

/// Display-ready notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub kind: NotificationKind,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_avatar: String,
    pub message: String,
    pub link: String,
    /// Recommendation the notification points at, if any.
    pub recommendation_id: Option<String>,
    pub image_url: Option<String>,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub time: String,
}

/// Category with its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub order: Option<i64>,
}
