//! Typed identifiers used throughout the simulation.
//!
//! Agents are addressed by name on the message bus (the identity/discovery
//! layer is an external collaborator that hands out names such as
//! `irrigation-1`), so [`AgentId`] wraps a string. Negotiation records get
//! UUID v7 (time-ordered) identifiers via the [`CfpId`] newtype.

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
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
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
    /// Unique identifier for a Call For Proposal (one negotiation round).
    CfpId
}

/// Bus-level name of an agent (e.g. `soil-sensor-0`, `logistics-1`).
///
/// The wire transport and identity layer address agents by name; the
/// lexicographic [`Ord`] on this type is the final, deterministic
/// tie-breaker during proposal selection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create an agent identifier from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for AgentId {
    fn from(name: String) -> Self {
        Self(name)
    }
}
