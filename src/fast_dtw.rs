//! FastDTW (Salvador & Chan): multi-resolution approximate alignment.
//!
//! The driver halves both streams by averaging consecutive point pairs,
//! aligns the coarse pair recursively, projects the coarse path onto the
//! finer grid with [`expand`](crate::strided_window::StridedWindow::expand),
//! and re-aligns inside that band. `radius` widens the band: 0 or 1 give
//! coarse approximations, around 8 stays within a few percent on correlated
//! random walks of a few thousand points. The reported cost is an upper
//! bound on the exact cost (a subset of alignments is searched) and equals
//! it whenever the optimal path falls inside the expanded band. Time and
//! space are `O((R + C) * radius)` amortized across the recursion.

use crate::dtw::{WarpInfo, WarpSummary, full_dtw, windowed_dtw};
use crate::stream::{Point, Stream};

/// Minimum operand length, relative to `radius`, at which halving still
/// produces a meaningfully coarser subproblem.
const BASE_CASE_SLACK: usize = 4;

/// Halves a stream by averaging consecutive point pairs.
///
/// An odd-length stream drops its trailing point; the parity is carried
/// into [`expand`](crate::strided_window::StridedWindow::expand) so the
/// finer grid regains the row or column.
fn reduce_by_half(input: &Stream) -> Stream {
    let halved = input
        .points()
        .chunks_exact(2)
        .map(|pair| {
            Point::new(
                0.5 * (pair[0].x + pair[1].x),
                0.5 * (pair[0].y + pair[1].y),
            )
        })
        .collect();
    Stream::new(halved)
}

pub(crate) fn fast_dtw(a: &Stream, b: &Stream, radius: usize) -> WarpInfo {
    if a.len().min(b.len()) < radius + BASE_CASE_SLACK {
        return full_dtw(a, b);
    }
    let coarse_a = reduce_by_half(a);
    let coarse_b = reduce_by_half(b);
    let coarse = fast_dtw(&coarse_a, &coarse_b, radius);
    let window = coarse.path_mask.expand(a.len() % 2, b.len() % 2, radius);
    // An expanded path-mask always spans both corners and matches the
    // operand shape, so the banded fill cannot fail; the dense fill is the
    // release-mode fallback if that invariant is ever broken.
    match windowed_dtw(a, b, &window) {
        Ok(info) => info,
        Err(_) => full_dtw(a, b),
    }
}

/// Approximate alignment of two streams: cost plus warp path, banded by
/// `radius`.
///
/// Exact (identical to [`full_warp_summary`](crate::dtw::full_warp_summary))
/// whenever `min(R, C) < radius + 4`, since the recursion then bottoms out
/// in a dense fill. If either stream has fewer than two points the result
/// is the defined degenerate summary: cost 0 and the single pairing
/// `(0, 0)`.
pub fn fast_warp_summary(a: &Stream, b: &Stream, radius: usize) -> WarpSummary {
    if a.len() < 2 || b.len() < 2 {
        return WarpSummary::degenerate();
    }
    let info = fast_dtw(a, b, radius);
    WarpSummary {
        cost: info.cost,
        index_pairs: info.path_mask.to_index_pairs(),
    }
}
