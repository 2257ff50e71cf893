//! # bridge-cache
//!
//! Client-side entity cache for a content-management server bridge.
//!
//! The bridge mirrors server resources (groups, members, documents, comments,
//! memberships, xrefs) as plain Rust values. This crate keeps the local copy:
//! one thread-safe store per entity type, indexed by the server's numeric id and
//! by the entity's human-readable key.
//!
//! ## Features
//!
//! - **Dual index:** Look entities up by id or by key (username, group name, URL)
//! - **Last write wins:** A put replaces the whole entity, the cache never merges
//! - **Concurrent:** Sharded locks, puts to different ids do not block each other
//! - **Registry:** One store per type, built lazily, injectable or process-wide
//! - **Read-through:** [`EntityManager`] combines a store with an [`EntitySource`]
//! - **Snapshots:** Export and import stores as versioned postcard blobs
//!
//! ## Quick Start
//!
//! ```
//! use bridge_cache::model::Member;
//! use bridge_cache::{CacheRegistry, EntityCache};
//!
//! let registry = CacheRegistry::new();
//! let members = registry.store::<Member>();
//!
//! members.put(Member::new(7).with_username("alice"))?;
//!
//! assert_eq!(members.get_by_key("alice").and_then(|m| m.id), Some(7));
//! assert!(members.get_version("alice").is_some());
//!
//! members.remove("alice");
//! assert!(members.get(7).is_none());
//! # Ok::<(), bridge_cache::Error>(())
//! ```
//!
//! Entities without an id cannot be stored:
//!
//! ```
//! use bridge_cache::model::Member;
//! use bridge_cache::{EntityCache, EntityStore, Error};
//!
//! let store = EntityStore::<Member>::new();
//! let result = store.put(Member::with_only_username("ghost"));
//! assert!(matches!(result, Err(Error::NonIdentifiableEntity(_))));
//! ```

#[macro_use]
extern crate log;

pub mod config;
pub mod entity;
pub mod error;
pub mod key;
pub mod manager;
pub mod model;
pub mod observability;
pub mod registry;
pub mod serialization;
pub mod source;
pub mod store;
pub mod strategy;

// Re-exports for convenience
pub use config::CacheConfig;
pub use entity::{BridgeEntity, EntityValidity};
pub use error::{Error, Result};
pub use key::Lookup;
pub use manager::{EntityManager, OperationConfig};
pub use registry::CacheRegistry;
pub use source::EntitySource;
pub use store::{EntityCache, EntityStore, Version};
pub use strategy::CacheStrategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Release recorded by the build script from the `VERSION` file.
pub const RELEASE: &str = env!("BRIDGE_CACHE_RELEASE");
