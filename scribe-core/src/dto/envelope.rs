//! Response envelope handling
//!
//! The API may wrap a payload as `{ "data": T }` or return `T` directly.

use serde::{Deserialize, Serialize};

/// A payload that may or may not be wrapped in a `data` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    /// Returns the payload, unwrapping the envelope if present
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}
