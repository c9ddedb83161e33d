//! # Streamfreq
//!
//! Count sketch frequency estimation for data streams.
//!
//! Streamfreq tracks the frequency of items observed in a stream while
//! holding only a bounded amount of memory, trading exactness for a
//! probabilistic error bound. The sketch keeps a depth x width table of
//! signed counters, routes every key through pairwise-independent hash
//! rows, and reconciles the per-row observations with a median.
//!
//! ## Quick Start
//!
//! ```rust
//! use streamfreq::prelude::*;
//!
//! let mut sketch = CountSketch::with_dimensions(2048, 5);
//!
//! for word in ["apple", "banana", "apple"] {
//!     sketch.add(word.as_bytes(), 1).unwrap();
//! }
//! println!("apple: ~{}", sketch.estimate(b"apple"));
//! ```
//!
//! ## Distributed Aggregation
//!
//! Sketches built with the same dimensions and seed merge cell-wise, so
//! partial sketches from separate workers combine into one:
//!
//! ```rust
//! use streamfreq::frequency::CountSketch;
//! use streamfreq::traits::Sketch;
//!
//! let mut worker1 = CountSketch::with_seed(2048, 5, 42);
//! let mut worker2 = CountSketch::with_seed(2048, 5, 42);
//!
//! worker1.add(b"user_a", 3).unwrap();
//! worker2.add(b"user_a", 4).unwrap();
//!
//! worker1.merge(&worker2).unwrap();
//! assert_eq!(worker1.estimate(b"user_a"), 7);
//! ```
//!
//! ## Persistence
//!
//! [`CountSketch::to_bytes`] and [`CountSketch::from_bytes`] give a
//! byte-exact big-endian encoding of the full sketch state for exchange
//! between processes. A plain-text counter dump is also available for
//! inspection; it carries no shape metadata and is not authoritative.
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `serde`: Enable serialization
//! - `cli`: The `streamfreq` interactive console binary
//!
//! [`CountSketch::to_bytes`]: frequency::CountSketch::to_bytes
//! [`CountSketch::from_bytes`]: frequency::CountSketch::from_bytes

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Core traits always available
pub mod traits;

pub mod frequency;

mod hash;
mod math;

pub mod prelude {
    pub use crate::frequency::CountSketch;
    pub use crate::traits::*;
}

pub use frequency::CountSketch;
