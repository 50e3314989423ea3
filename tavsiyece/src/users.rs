//! User directory: profile lookups and the sign-up / edit-profile writes.
//!
//! Reads never surface backend errors. A failed lookup is logged and reported
//! as a missing profile.

use std::collections::HashMap;

use email_address::EmailAddress;
use futures::future::join_all;
use log::{debug, warn};

use crate::{
    config::Limits,
    errors::{ServiceResult, ValidationError, ValidationIssue},
    keys,
    models::{DEFAULT_BIO, Profile, UserDoc},
    store::{Document, DocumentStore, Fields, Query, WriteBatch, id_chunks},
    text::normalize,
};

/// Sign-up record mirrored from the identity provider.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub username: String,
}

/// Editable profile fields.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub username: String,
    pub bio: String,
}

pub struct UserDirectory<'a, S> {
    store: &'a S,
    limits: &'a Limits,
}

fn to_profile(doc: &Document) -> Option<Profile> {
    match doc.decode::<UserDoc>() {
        Ok(user) => Some(Profile::new(doc.id.clone(), user)),
        Err(err) => {
            warn!("skipping malformed user document {}: {err}", doc.path);
            None
        }
    }
}

fn require(issues: &mut Vec<ValidationIssue>, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(field, "required", message));
    }
}

impl<'a, S: DocumentStore> UserDirectory<'a, S> {
    pub fn new(store: &'a S, limits: &'a Limits) -> Self {
        Self { store, limits }
    }

    pub async fn get_profile(&self, user_id: &str) -> Option<Profile> {
        if user_id.is_empty() {
            return None;
        }
        match self.store.get(&keys::user(user_id)).await {
            Ok(Some(doc)) => to_profile(&doc),
            Ok(None) => None,
            Err(err) => {
                warn!("profile lookup for {user_id} failed: {err}");
                None
            }
        }
    }

    /// Fetches many profiles, one id-membership query per chunk of ids.
    ///
    /// Chunks are queried concurrently. Ids that do not resolve, or whose
    /// chunk failed, are absent from the map.
    pub async fn get_profiles<I, V>(&self, ids: I) -> HashMap<String, Profile>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let queries: Vec<Query> = id_chunks(ids, self.limits.batch_lookup)
            .into_iter()
            .map(|chunk| Query::collection(keys::users()).where_id_in(chunk))
            .collect();
        if queries.is_empty() {
            return HashMap::new();
        }
        debug!("hydrating profiles in {} chunk(s)", queries.len());

        let results = join_all(queries.iter().map(|query| self.store.query(query))).await;

        let mut profiles = HashMap::new();
        for result in results {
            match result {
                Ok(docs) => {
                    for doc in &docs {
                        if let Some(profile) = to_profile(doc) {
                            profiles.insert(profile.id.clone(), profile);
                        }
                    }
                }
                Err(err) => warn!("profile chunk lookup failed: {err}"),
            }
        }
        profiles
    }

    /// Email of the account whose normalized username matches; first match wins.
    pub async fn find_email_by_username(&self, username: &str) -> Option<String> {
        let normalized = normalize(username.trim());
        if normalized.is_empty() {
            return None;
        }
        let query = Query::collection(keys::users())
            .where_eq("username_lowercase", normalized.as_str())
            .limit(1);
        match self.store.query(&query).await {
            Ok(docs) => docs
                .first()
                .and_then(to_profile)
                .and_then(|profile| profile.user.email)
                .filter(|email| !email.is_empty()),
            Err(err) => {
                warn!("username lookup for {normalized} failed: {err}");
                None
            }
        }
    }

    /// Writes the directory record for a freshly registered account.
    pub async fn create_profile(&self, profile: NewProfile) -> ServiceResult<Profile> {
        let mut issues = Vec::new();
        require(&mut issues, "userId", &profile.user_id, "Kullanıcı kimliği zorunludur.");
        require(&mut issues, "name", &profile.name, "Tüm alanlar zorunludur.");
        require(&mut issues, "username", &profile.username, "Tüm alanlar zorunludur.");
        require(&mut issues, "email", &profile.email, "Tüm alanlar zorunludur.");
        let email = profile.email.trim().to_lowercase();
        if !email.is_empty() && !EmailAddress::is_valid(&email) {
            issues.push(ValidationIssue::new("email", "invalid_email", "Geçersiz e-posta adresi formatı."));
        }
        ValidationError::new(issues).into_result()?;

        let name = profile.name.trim().to_string();
        let username = profile.username.trim().to_string();
        let fields = Fields::new()
            .with("userId", profile.user_id.as_str())
            .with("email", email.as_str())
            .with("name", name.as_str())
            .with("username", username.as_str())
            .with("name_lowercase", normalize(&name))
            .with("username_lowercase", normalize(&username))
            .with("bio", DEFAULT_BIO)
            .with("photoURL", serde_json::Value::Null)
            .server_timestamp("createdAt");
        self.store.set(keys::user(&profile.user_id), fields).await?;

        Ok(Profile::new(
            profile.user_id.clone(),
            UserDoc {
                user_id: Some(profile.user_id),
                email: Some(email),
                name_lowercase: Some(normalize(&name)),
                username_lowercase: Some(normalize(&username)),
                name: Some(name),
                username: Some(username),
                bio: Some(DEFAULT_BIO.to_string()),
                ..UserDoc::default()
            },
        ))
    }

    /// Applies an edit-profile form; the normalized search keys follow the new values.
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> ServiceResult<()> {
        let mut issues = Vec::new();
        require(&mut issues, "name", &update.name, "İsim ve Kullanıcı Adı alanları zorunludur.");
        require(&mut issues, "username", &update.username, "İsim ve Kullanıcı Adı alanları zorunludur.");
        ValidationError::new(issues).into_result()?;

        let name = update.name.trim();
        let username = update.username.trim();
        let mut batch = WriteBatch::new();
        batch.update(
            keys::user(user_id),
            Fields::new()
                .with("name", name)
                .with("username", username)
                .with("bio", update.bio.as_str())
                .with("name_lowercase", normalize(name))
                .with("username_lowercase", normalize(username)),
        );
        self.store.commit(batch).await?;
        Ok(())
    }
}
