//! An in-memory R-tree spatial index over axis-aligned rectangles.
//!
//! ```
//! use rtreedex::geometry::Rectangle;
//! use rtreedex::Index;
//!
//! let mut index = Index::new(4, 2).unwrap();
//! index.insert(Rectangle::new(0.0, 0.0, 10.0, 10.0), 1);
//! index.insert(Rectangle::new(20.0, 20.0, 30.0, 30.0), 2);
//!
//! // rectangle 2 also overlaps the query window over (20,20)-(25,25).
//! // Order is traversal order, insertion order here since both land in
//! // one leaf.
//! let hits = index.range(Rectangle::new(5.0, 5.0, 25.0, 25.0));
//! assert_eq!(hits, vec![1, 2]);
//! ```

mod bulk;
pub mod error;
pub mod geometry;
mod heap;
#[cfg(feature = "setup_tracing")]
mod logging;
mod node;
mod query;
mod tree;

pub use error::RTreeError;
pub use tree::Index;
