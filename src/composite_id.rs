// Copyright 2025 Cowboy AI, LLC.

//! Composite id codec
//!
//! Records returned from a composite service carry ids of the form
//! `p<index>_<originalId>`, where `index` is the zero-based position of the
//! owning adapter at composite construction time. Decoding is only valid
//! against the same adapter list and order that encoded the id; composites
//! are therefore immutable with respect to their adapter ordering.

use std::fmt;

/// A decoded composite id: owning adapter index plus the backend-native id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    /// Zero-based index of the owning adapter
    pub index: usize,
    /// The backend's native id (may itself contain underscores)
    pub original: String,
}

impl CompositeId {
    /// Create a composite id from its parts
    pub fn new(index: usize, original: impl Into<String>) -> Self {
        Self {
            index,
            original: original.into(),
        }
    }

    /// Encode an adapter index and native id into the wire form
    pub fn encode(index: usize, original: &str) -> String {
        format!("p{index}_{original}")
    }

    /// Decode a wire-form id, splitting on the first underscore only
    ///
    /// Returns `None` for anything that is not `p<digits>_<rest>`; callers
    /// treat that as a bare per-platform id and fall back to probing.
    pub fn parse(id: &str) -> Option<CompositeId> {
        let rest = id.strip_prefix('p')?;
        let underscore = rest.find('_')?;
        let (digits, tail) = rest.split_at(underscore);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: usize = digits.parse().ok()?;
        Some(CompositeId::new(index, &tail[1..]))
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}_{}", self.index, self.original)
    }
}
