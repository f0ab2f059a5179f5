//! Dynamic time warping for planar polyline streams.
//!
//! This crate aligns two-dimensional point streams: an exact quadratic
//! kernel with back-trace, the multi-resolution FastDTW approximation of
//! Salvador & Chan driven by a strided search window, and the consumers of
//! an alignment: a `[0, 1]` similarity score, medoid selection over a
//! collection, and DTW barycenter averaging.
//!
//! Public invariants (must not change):
//! - Alignment cost is a sum of *squared* Euclidean step distances; the
//!   similarity gates use true Euclidean distance.
//! - The warping recurrence breaks ties diagonal, then up, then left; the
//!   test suite pins exact paths against that order.
//! - Numeric code is deterministic (no RNG in core ops) and inputs are
//!   immutable snapshots, so identical calls give identical results.

pub mod consensus;
pub mod dtw;
pub mod fast_dtw;
pub mod filters;
pub mod io;
pub mod similarity;
pub mod stream;
pub mod strided_window;

// Re-export the primary surface at the crate root.
pub use consensus::{dba_consensus, medoid_consensus, pairwise_cost_matrix};
pub use dtw::{WarpSummary, full_dtw_cost, full_warp_summary};
pub use fast_dtw::fast_warp_summary;
pub use similarity::similarity;
pub use stream::{Point, Stream, StreamCollection};
pub use strided_window::StridedWindow;
