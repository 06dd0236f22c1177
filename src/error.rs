//! Error types for the R-tree index.
//!
//! `NotFound` is deliberately not a variant here: `Index::delete` reports a
//! missing entry as `false`, not as an error, since "nothing to delete" is an
//! ordinary outcome rather than a failure.

use std::error::Error;
use std::fmt;

/// Errors the index can report to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RTreeError {
    /// `capacity`/`min_fill` failed the `1 <= min_fill` and
    /// `2 * min_fill <= capacity + 1` checks.
    InvalidConfiguration { capacity: u32, min_fill: u32 },
    /// An optional consistency check found the tree in a structurally
    /// inconsistent state. This is never returned from a public method; it is
    /// only ever logged (see `src/logging.rs`), since by the time the check
    /// runs the mutation that triggered it has already returned.
    InvariantViolation { detail: String },
    /// The node store failed to allocate a new node.
    ResourceExhaustion,
}

impl fmt::Display for RTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RTreeError::InvalidConfiguration { capacity, min_fill } => write!(
                f,
                "invalid configuration: capacity={capacity}, min_fill={min_fill} \
                 (require 1 <= min_fill and 2 * min_fill <= capacity + 1)"
            ),
            RTreeError::InvariantViolation { detail } => {
                write!(f, "invariant violation: {detail}")
            }
            RTreeError::ResourceExhaustion => write!(f, "node store allocation failed"),
        }
    }
}

impl Error for RTreeError {}
