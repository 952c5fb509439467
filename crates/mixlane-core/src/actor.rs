//! # Actors — Explicit Identity at Every Entry Point
//!
//! Every state-changing operation takes an `Actor` parameter identifying
//! who is acting and in what capacity. The engine never consults ambient
//! session state — the host system resolves its authentication (login
//! session, or a time-limited signed portal link for external clients)
//! into an `Actor` before calling in.

use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// An opaque reference to an external client reviewer.
///
/// Clients reach the review portal through a signed capability link and
/// may have no account at all; the reference is whatever stable
/// identifier the host system minted for them (typically an email hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientRef(pub String);

impl std::fmt::Display for ClientRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client:{}", self.0)
    }
}

/// The capacity in which an actor is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    /// The producer who owns and works the pitch.
    Producer,
    /// The owner of the project (the internal reviewer).
    ProjectOwner,
    /// The external client reviewer (portal actor, possibly unauthenticated).
    Client,
}

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    /// The producer working the pitch.
    Producer {
        /// The producer's user id.
        user: UserId,
    },
    /// The project owner (internal reviewer).
    ProjectOwner {
        /// The owner's user id.
        user: UserId,
    },
    /// An external client acting through the portal.
    Client {
        /// Opaque client reference minted by the host system.
        client: ClientRef,
    },
}

impl Actor {
    /// The role this actor is acting in.
    pub fn role(&self) -> ActorRole {
        match self {
            Self::Producer { .. } => ActorRole::Producer,
            Self::ProjectOwner { .. } => ActorRole::ProjectOwner,
            Self::Client { .. } => ActorRole::Client,
        }
    }

    /// The user id, for authenticated actors.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Producer { user } | Self::ProjectOwner { user } => Some(*user),
            Self::Client { .. } => None,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Producer { user } => write!(f, "producer:{}", user.as_uuid()),
            Self::ProjectOwner { user } => write!(f, "owner:{}", user.as_uuid()),
            Self::Client { client } => write!(f, "{client}"),
        }
    }
}
