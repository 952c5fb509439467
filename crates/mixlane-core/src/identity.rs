//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the Mixlane engine.
//! These prevent accidental identifier confusion — you cannot pass a
//! `PitchId` where a `MilestoneId` is expected, and a payment webhook
//! carrying the wrong kind of id fails to type-check rather than paying
//! the wrong milestone.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a project (the unit of client work).
    ProjectId,
    "project"
);

define_id!(
    /// Unique identifier for a pitch (a unit of submitted work).
    PitchId,
    "pitch"
);

define_id!(
    /// Unique identifier for an immutable submission snapshot.
    SnapshotId,
    "snapshot"
);

define_id!(
    /// Unique identifier for a payable milestone checkpoint.
    MilestoneId,
    "milestone"
);

define_id!(
    /// Unique identifier for an audit-trail event.
    EventId,
    "event"
);

define_id!(
    /// Unique identifier for a stored file.
    FileId,
    "file"
);

define_id!(
    /// Unique identifier for an authenticated user (producer or owner).
    UserId,
    "user"
);
