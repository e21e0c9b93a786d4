//! Typed identifiers for users, workspaces, pages, and blocks.
//!
//! All ID types wrap UUIDv7 (time-ordered, globally unique). They serialize as
//! standard UUID text and display the same way for logging. The `short()` form
//! (first 8 hex chars) is for logs and never used as a lookup key. Handles
//! meant to be typed back come from `unique_short()`, and [`resolve_prefix`]
//! turns a typed prefix back into an ID.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A user identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(uuid::Uuid);

/// A workspace identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(uuid::Uuid);

/// A page identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(uuid::Uuid);

/// A block identifier (UUIDv7).
///
/// Unique across the whole store, not just within a page. Assigned once at
/// creation and never rewritten.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(uuid::Uuid);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Create a new time-ordered ID (UUIDv7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// First 8 hex characters, for display only.
            pub fn short(&self) -> String {
                self.0.as_simple().to_string()[..8].to_string()
            }

            /// Full 32-character hex string (no hyphens).
            pub fn to_hex(&self) -> String {
                self.0.as_simple().to_string()
            }

            /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                uuid::Uuid::parse_str(s).map(Self)
            }

            /// Check if a query string matches this ID by hex prefix.
            pub fn matches_hex_prefix(&self, prefix: &str) -> bool {
                let prefix = prefix.replace('-', "").to_ascii_lowercase();
                self.to_hex().starts_with(&prefix)
            }

            /// Shortest hex prefix (at least 8 chars) that no id in `others`
            /// shares, so it resolves back to this id.
            ///
            /// Ids minted in the same minute share their first 8 hex chars,
            /// so `short()` alone is not a usable handle.
            pub fn unique_short(&self, others: impl IntoIterator<Item = Self>) -> String {
                let hex = self.to_hex();
                let shared = others
                    .into_iter()
                    .filter(|other| other != self)
                    .map(|other| {
                        hex.bytes()
                            .zip(other.to_hex().bytes())
                            .take_while(|(a, b)| a == b)
                            .count()
                    })
                    .max()
                    .unwrap_or(0);
                hex[..(shared + 1).clamp(8, hex.len())].to_string()
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $T {
            fn from(u: uuid::Uuid) -> Self {
                Self(u)
            }
        }

        impl From<$T> for uuid::Uuid {
            fn from(id: $T) -> uuid::Uuid {
                id.0
            }
        }

        impl std::str::FromStr for $T {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Full UUID with hyphens for log readability
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }
    };
}

impl_typed_id!(UserId, "UserId");
impl_typed_id!(WorkspaceId, "WorkspaceId");
impl_typed_id!(PageId, "PageId");
impl_typed_id!(BlockId, "BlockId");

// ── Prefix resolution ───────────────────────────────────────────────────────

/// Error from ambiguous prefix resolution.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("no match for prefix '{0}'")]
    NoMatch(String),
    #[error("ambiguous prefix '{prefix}': matches {candidates:?}")]
    Ambiguous {
        prefix: String,
        candidates: Vec<String>,
    },
}

/// Resolve a typed query against a set of block IDs.
///
/// Resolution order:
/// 1. Exact ID (full UUID or 32-char hex)
/// 2. Unique hex prefix match
/// 3. Error (no match or ambiguous)
pub fn resolve_prefix(
    ids: impl IntoIterator<Item = BlockId>,
    query: &str,
) -> Result<BlockId, PrefixError> {
    let ids: Vec<BlockId> = ids.into_iter().collect();

    // 1. Exact ID
    if let Ok(exact) = BlockId::parse(query)
        && ids.contains(&exact)
    {
        return Ok(exact);
    }

    // 2. Unique hex prefix match
    let matches: Vec<BlockId> = ids
        .iter()
        .filter(|id| id.matches_hex_prefix(query))
        .copied()
        .collect();

    match matches.len() {
        0 => Err(PrefixError::NoMatch(query.to_string())),
        1 => Ok(matches[0]),
        _ => Err(PrefixError::Ambiguous {
            prefix: query.to_string(),
            candidates: matches
                .iter()
                .map(|id| id.unique_short(matches.iter().copied()))
                .collect(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
