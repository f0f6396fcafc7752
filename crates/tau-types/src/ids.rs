//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Entity identifiers are random (UUID v4), generated once at construction
//! and never reassigned. Narrative strings only ever show a short prefix.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier (UUID v4).
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            /// First `len` hex characters of the identifier, for narratives.
            pub fn prefix(&self, len: usize) -> String {
                self.0.simple().to_string().chars().take(len).collect()
            }

            /// The eight-character prefix used in log lines and lineage stories.
            pub fn short(&self) -> String {
                self.prefix(8)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an entity. Immutable once assigned.
    EntityId
}
