#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod content;
pub mod realm;
pub mod seed;

pub use content::{ContentId, ContentKey, ContentLookup, ContentTable, ContentTableError, Voxel};
pub use realm::{RealmKind, UnknownRealm};
pub use seed::scoped_rng;
