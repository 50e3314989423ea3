//! Tavsiyece core library.
//!
//! Social graph, feed assembly, search and engagement services for the
//! Tavsiyece recommendation app, written against a pluggable document store.

pub mod avatar;
pub mod client;
pub mod comments;
pub mod config;
pub mod errors;
pub mod feed;
pub mod graph;
pub mod id;
pub mod keys;
pub mod models;
pub mod notifications;
pub mod optimistic;
pub mod recommendations;
pub mod search;
pub mod store;
pub mod text;
pub mod time;
pub mod users;

pub use client::Tavsiyece;
pub use config::{ConfigError, FeedOrdering, Limits, TavsiyeceConfig};
pub use errors::*;
pub use feed::FeedOutcome;
pub use models::*;
pub use notifications::{Actor, NotificationDispatcher, NotificationEmitter};
pub use optimistic::OptimisticToggle;
pub use search::{SearchFailure, SearchOutcome, SearchResults, SearchSection};
pub use store::{DocumentStore, MemoryStore, RedisStore};

pub use redis;
pub use redis::aio::ConnectionManager;
