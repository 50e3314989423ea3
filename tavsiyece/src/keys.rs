//! Document paths and the key helpers that map them onto a backend.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const USERS: &str = "users";
pub const RECOMMENDATIONS: &str = "recommendations";
pub const CATEGORIES: &str = "categories";

/// Slash-separated path of a collection, e.g. `users/u1/following`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionPath(String);

/// Slash-separated path of a single document, e.g. `users/u1/following/u2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocPath(String);

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn doc(&self, id: &str) -> DocPath {
        DocPath(format!("{}/{}", self.0, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocPath {
    /// Path of a sub-collection nested under this document.
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}", self.0, name))
    }

    /// Collection this document lives in.
    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_string()),
            None => CollectionPath(String::new()),
        }
    }

    pub fn id(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some((_, id)) => id,
            None => &self.0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn users() -> CollectionPath {
    CollectionPath::root(USERS)
}

pub fn user(user_id: &str) -> DocPath {
    users().doc(user_id)
}

/// Edge mirror kept under the follower: `users/{follower}/following/{followee}`.
pub fn following(user_id: &str) -> CollectionPath {
    user(user_id).collection("following")
}

/// Edge mirror kept under the followee: `users/{followee}/followers/{follower}`.
pub fn followers(user_id: &str) -> CollectionPath {
    user(user_id).collection("followers")
}

pub fn liked_recommendations(user_id: &str) -> CollectionPath {
    user(user_id).collection("likedRecommendations")
}

pub fn saved_recommendations(user_id: &str) -> CollectionPath {
    user(user_id).collection("savedRecommendations")
}

pub fn notifications(user_id: &str) -> CollectionPath {
    user(user_id).collection("notifications")
}

pub fn recommendations() -> CollectionPath {
    CollectionPath::root(RECOMMENDATIONS)
}

pub fn recommendation(recommendation_id: &str) -> DocPath {
    recommendations().doc(recommendation_id)
}

pub fn recommendation_likes(recommendation_id: &str) -> CollectionPath {
    recommendation(recommendation_id).collection("likes")
}

pub fn comments(recommendation_id: &str) -> CollectionPath {
    recommendation(recommendation_id).collection("comments")
}

pub fn comment(recommendation_id: &str, comment_id: &str) -> DocPath {
    comments(recommendation_id).doc(comment_id)
}

pub fn comment_likes(recommendation_id: &str, comment_id: &str) -> CollectionPath {
    comment(recommendation_id, comment_id).collection("likes")
}

pub fn replies(recommendation_id: &str, comment_id: &str) -> CollectionPath {
    comment(recommendation_id, comment_id).collection("replies")
}

pub fn categories() -> CollectionPath {
    CollectionPath::root(CATEGORIES)
}

/// Maps document paths onto Redis keys under a namespace prefix.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// Key holding the JSON body of a document.
    pub fn document(&self, path: &DocPath) -> String {
        format!("{}:doc:{}", self.prefix, path)
    }

    /// Key of the set listing the ids present in a collection.
    pub fn collection(&self, path: &CollectionPath) -> String {
        format!("{}:col:{}", self.prefix, path)
    }

    /// Pattern matching every key in this namespace.
    pub fn namespace_pattern(&self) -> String {
        format!("{}:*", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_paths() {
        assert_eq!(following("a").doc("b").as_str(), "users/a/following/b");
        assert_eq!(comment_likes("r1", "c1").as_str(), "recommendations/r1/comments/c1/likes");
        assert_eq!(replies("r1", "c1").doc("x").id(), "x");
    }

    #[test]
    fn doc_path_parent_round_trips() {
        let path = liked_recommendations("u1").doc("r9");
        assert_eq!(path.parent(), liked_recommendations("u1"));
        assert_eq!(path.id(), "r9");
    }

    #[test]
    fn builds_redis_keys() {
        let ctx = KeyContext::new("tv");
        assert_eq!(ctx.document(&user("abc")), "tv:doc:users/abc");
        assert_eq!(ctx.collection(&followers("abc")), "tv:col:users/abc/followers");
    }
}
