//! Entities mirrored from the content-management server.
//!
//! Each type is a plain value built by the XML layer, usually seeded from a
//! previously cached instance and refined with the `with_*` builders:
//!
//! ```
//! use bridge_cache::model::Member;
//!
//! let cached = Member::new(7).with_username("alice");
//! let refreshed = cached.clone().with_email("alice@example.org");
//! assert_eq!(refreshed.username.as_deref(), Some("alice"));
//! ```

pub mod comment;
pub mod document;
pub mod group;
pub mod member;
pub mod membership;
pub mod xref;

pub use comment::Comment;
pub use document::Document;
pub use group::Group;
pub use member::Member;
pub use membership::Membership;
pub use xref::{XRef, XRefType};
