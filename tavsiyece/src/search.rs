//! Keyword search over recommendations and prefix search over usernames.
//!
//! The two sections are queried concurrently and fail independently: a
//! broken section is reported in [`SearchResults::failures`] while the other
//! still returns its matches.

use std::collections::HashSet;

use futures::join;
use log::{debug, warn};

use crate::{
    config::Limits,
    errors::{ServiceError, ServiceResult},
    keys,
    models::{Profile, RecommendationDoc, RecommendationResult, UserDoc, UserResult},
    store::{Direction, DocumentStore, Query},
    text::{normalize, query_tokens},
};

/// Upper bound appended to a prefix to form an inclusive range.
const PREFIX_SENTINEL: char = '\u{f8ff}';

#[derive(Debug)]
pub enum SearchOutcome {
    /// The query was blank; no search is active.
    Inactive,
    Results(SearchResults),
}

#[derive(Debug, Default)]
pub struct SearchResults {
    pub users: Vec<UserResult>,
    pub recommendations: Vec<RecommendationResult>,
    pub failures: Vec<SearchFailure>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.recommendations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSection {
    Users,
    Recommendations,
}

#[derive(Debug)]
pub struct SearchFailure {
    pub section: SearchSection,
    pub error: ServiceError,
}

pub struct SearchAggregator<'a, S> {
    store: &'a S,
    limits: &'a Limits,
}

/// Longest token, first one on ties.
fn anchor_token(tokens: &[String]) -> Option<&String> {
    tokens
        .iter()
        .fold(None, |best: Option<&String>, token| match best {
            Some(current) if current.chars().count() >= token.chars().count() => Some(current),
            _ => Some(token),
        })
}

impl<'a, S: DocumentStore> SearchAggregator<'a, S> {
    pub fn new(store: &'a S, limits: &'a Limits) -> Self {
        Self { store, limits }
    }

    pub async fn search(&self, raw_query: &str) -> SearchOutcome {
        let trimmed = raw_query.trim();
        if trimmed.is_empty() {
            return SearchOutcome::Inactive;
        }
        let normalized = normalize(trimmed);
        let mut tokens = query_tokens(trimmed);
        if tokens.is_empty() {
            tokens.push(normalized.clone());
        }
        debug!("searching {normalized:?} with tokens {tokens:?}");

        let (recommendations, users) = join!(self.search_recommendations(&normalized, &tokens), self.search_users(&normalized));

        let mut results = SearchResults::default();
        match recommendations {
            Ok(found) => results.recommendations = found,
            Err(error) => {
                warn!("recommendation search for {normalized:?} failed: {error}");
                results.failures.push(SearchFailure {
                    section: SearchSection::Recommendations,
                    error,
                });
            }
        }
        match users {
            Ok(found) => results.users = found,
            Err(error) => {
                warn!("user search for {normalized:?} failed: {error}");
                results.failures.push(SearchFailure {
                    section: SearchSection::Users,
                    error,
                });
            }
        }
        SearchOutcome::Results(results)
    }

    /// Recommendations whose keywords contain the whole normalized query,
    /// followed by those containing every token.
    ///
    /// The whole-query match covers stored keywords that are never split,
    /// such as a hyphenated category. The longest token drives the
    /// membership query for the token match; the remaining tokens filter
    /// its candidates.
    async fn search_recommendations(
        &self,
        normalized: &str,
        tokens: &[String],
    ) -> ServiceResult<Vec<RecommendationResult>> {
        let Some(anchor) = anchor_token(tokens) else {
            return Ok(Vec::new());
        };
        let limit = self.limits.search_results;
        let scan = if tokens.len() == 1 {
            limit
        } else {
            self.limits.search_candidates.max(limit)
        };
        let token_query = Query::collection(keys::recommendations())
            .where_array_contains("keywords", anchor.as_str())
            .limit(scan);

        let docs = if anchor.as_str() == normalized {
            self.store.query(&token_query).await?
        } else {
            let exact_query = Query::collection(keys::recommendations())
                .where_array_contains("keywords", normalized)
                .limit(limit);
            let (exact, by_token) = join!(self.store.query(&exact_query), self.store.query(&token_query));
            let mut docs = exact?;
            docs.extend(by_token?);
            docs
        };

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for doc in docs {
            if seen.contains(&doc.id) {
                continue;
            }
            let rec: RecommendationDoc = match doc.decode() {
                Ok(rec) => rec,
                Err(err) => {
                    warn!("skipping malformed recommendation {}: {err}", doc.path);
                    continue;
                }
            };
            let matches = rec.keywords.iter().any(|keyword| keyword == normalized)
                || tokens.iter().all(|token| rec.keywords.contains(token));
            if matches {
                seen.insert(doc.id.clone());
                found.push(RecommendationResult::new(doc.id, &rec));
            }
        }
        found.truncate(limit);
        Ok(found)
    }

    /// Users whose normalized username starts with `prefix`.
    async fn search_users(&self, prefix: &str) -> ServiceResult<Vec<UserResult>> {
        let upper = format!("{prefix}{PREFIX_SENTINEL}");
        let query = Query::collection(keys::users())
            .where_ge("username_lowercase", prefix)
            .where_le("username_lowercase", upper)
            .order_by("username_lowercase", Direction::Asc)
            .limit(self.limits.search_results);
        let docs = self.store.query(&query).await?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| match doc.decode::<UserDoc>() {
                Ok(user) => Some(UserResult::from(&Profile::new(doc.id, user))),
                Err(err) => {
                    warn!("skipping malformed user document {}: {err}", doc.path);
                    None
                }
            })
            .collect())
    }
}
